//! Community vote tallies.

use serde::{Deserialize, Serialize};

/// Up/down vote counts for one player. Counts only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteTally {
    pub const fn new(upvotes: u64, downvotes: u64) -> Self {
        Self { upvotes, downvotes }
    }

    /// Upvotes minus downvotes. Computed, never stored.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Tally after one more vote in `direction`.
    #[must_use]
    pub const fn with_vote(self, direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self::new(self.upvotes.saturating_add(1), self.downvotes),
            VoteDirection::Down => Self::new(self.upvotes, self.downvotes.saturating_add(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("voteType must be \"up\" or \"down\", got {other:?}")),
        }
    }
}
