pub mod actions;
pub mod discover;
pub mod health;
pub mod matches;
