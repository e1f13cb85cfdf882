pub mod admin;
pub mod endorsements;
pub mod events;
pub mod health;
pub mod quiz;
