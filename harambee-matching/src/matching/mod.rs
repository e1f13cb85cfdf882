pub mod actions;
pub mod defaults;
pub mod normalize;
pub mod profile;
pub mod scoring;

#[cfg(test)]
pub(crate) mod testkit;

pub use actions::{reconcile, ActionState, MatchAction, RequestedAction, Side, Transition, UserPair};
pub use normalize::normalize;
pub use profile::ScoringProfile;
pub use scoring::{score, CompatibilityScore};
