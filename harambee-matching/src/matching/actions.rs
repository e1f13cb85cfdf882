//! Per-pair action state and how a new action is folded into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One side's stance towards the other. Stored as text in `matches.user{1,2}_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAction {
    Pending,
    Like,
    Pass,
    SuperLike,
}

impl MatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAction::Pending => "pending",
            MatchAction::Like => "like",
            MatchAction::Pass => "pass",
            MatchAction::SuperLike => "super_like",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, MatchAction::Like | MatchAction::SuperLike)
    }
}

impl fmt::Display for MatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchAction::Pending),
            "like" => Ok(MatchAction::Like),
            "pass" => Ok(MatchAction::Pass),
            "super_like" => Ok(MatchAction::SuperLike),
            other => Err(format!("unknown match action: {other}")),
        }
    }
}

/// What a member may submit. `pending` is never accepted from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedAction {
    Like,
    Pass,
    SuperLike,
}

impl From<RequestedAction> for MatchAction {
    fn from(action: RequestedAction) -> Self {
        match action {
            RequestedAction::Like => MatchAction::Like,
            RequestedAction::Pass => MatchAction::Pass,
            RequestedAction::SuperLike => MatchAction::SuperLike,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    User1,
    User2,
}

/// An unordered pair stored with the smaller id first, so each pair has one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserPair {
    pub user1: Uuid,
    pub user2: Uuid,
}

impl UserPair {
    /// `None` when both ids are the same member.
    pub fn new(a: Uuid, b: Uuid) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(Self {
            user1: a.min(b),
            user2: a.max(b),
        })
    }

    pub fn side_of(&self, user_id: Uuid) -> Option<Side> {
        if user_id == self.user1 {
            Some(Side::User1)
        } else if user_id == self.user2 {
            Some(Side::User2)
        } else {
            None
        }
    }

    pub fn other(&self, user_id: Uuid) -> Uuid {
        if user_id == self.user1 {
            self.user2
        } else {
            self.user1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionState {
    pub user1: MatchAction,
    pub user2: MatchAction,
    pub is_mutual: bool,
}

impl ActionState {
    pub fn fresh() -> Self {
        Self {
            user1: MatchAction::Pending,
            user2: MatchAction::Pending,
            is_mutual: false,
        }
    }

    pub fn action(&self, side: Side) -> MatchAction {
        match side {
            Side::User1 => self.user1,
            Side::User2 => self.user2,
        }
    }

    pub fn both_positive(&self) -> bool {
        self.user1.is_positive() && self.user2.is_positive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to write.
    Unchanged,
    Apply(ActionState),
}

/// Folds one side's action into the pair state.
///
/// A mutual pair is frozen. Repeating the current action is a no-op. A side
/// may otherwise change its mind (pass after like and the reverse) until the
/// pair becomes mutual. `is_mutual` flips once both sides are positive.
pub fn reconcile(state: ActionState, side: Side, requested: RequestedAction) -> Transition {
    if state.is_mutual {
        return Transition::Unchanged;
    }

    let action = MatchAction::from(requested);
    if state.action(side) == action {
        return Transition::Unchanged;
    }

    let mut next = state;
    match side {
        Side::User1 => next.user1 = action,
        Side::User2 => next.user2 = action,
    }
    next.is_mutual = next.both_positive();
    Transition::Apply(next)
}
