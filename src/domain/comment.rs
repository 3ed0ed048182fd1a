//! Fan comments on players, with replies and up/down votes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::PlayerId;
use super::vote::VoteTally;
use crate::error::CommentError;

pub type CommentId = String;

/// Longest message a person may post, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Longest message for machine-generated comments.
pub const MAX_GENERATED_MESSAGE_CHARS: usize = 1000;

pub const MAX_USER_ID_CHARS: usize = 30;

pub const MAX_COLLEGE_CHARS: usize = 50;

/// Comments returned per player listing.
pub const COMMENT_LIST_LIMIT: usize = 50;

/// A comment as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewComment {
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub user_id: Option<String>,
    pub college: Option<String>,
    pub college_logo: Option<String>,
    pub message: Option<String>,
    /// Comment this one replies to.
    pub parent_id: Option<String>,
    pub reply_to_user: Option<String>,
    pub is_ai_generated: bool,
}

/// A stored comment. Only the vote counts change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub user_id: String,
    pub college: String,
    pub college_logo: Option<String>,
    pub message: String,
    pub parent_id: Option<CommentId>,
    pub reply_to_user: Option<String>,
    pub is_ai_generated: bool,
    #[serde(flatten)]
    pub votes: VoteTally,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Validate and build the stored comment.
    ///
    /// Lengths are checked on the submitted text; stored text is trimmed.
    /// Generated comments get the longer message limit and skip the
    /// user and college limits.
    ///
    /// # Errors
    /// [`CommentError::MissingFields`] or [`CommentError::TooLong`].
    pub fn validate(self, now: DateTime<Utc>) -> Result<Comment, CommentError> {
        let (Some(player_id), Some(user_id), Some(college), Some(message)) = (
            present(self.player_id),
            present(self.user_id),
            present(self.college),
            present(self.message),
        ) else {
            return Err(CommentError::MissingFields);
        };

        let message_limit = if self.is_ai_generated {
            MAX_GENERATED_MESSAGE_CHARS
        } else {
            MAX_MESSAGE_CHARS
        };
        check_length("message", &message, message_limit)?;
        if !self.is_ai_generated {
            check_length("userId", &user_id, MAX_USER_ID_CHARS)?;
            check_length("college", &college, MAX_COLLEGE_CHARS)?;
        }

        Ok(Comment {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.trim().to_string(),
            player_name: present(self.player_name).unwrap_or_else(|| "Unknown".to_string()),
            user_id: user_id.trim().to_string(),
            college: college.trim().to_string(),
            college_logo: present(self.college_logo),
            message: message.trim().to_string(),
            parent_id: present(self.parent_id),
            reply_to_user: present(self.reply_to_user),
            is_ai_generated: self.is_ai_generated,
            votes: VoteTally::default(),
            created_at: now,
        })
    }
}

impl Comment {
    pub const fn score(&self) -> i64 {
        self.votes.score()
    }

    pub const fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// `Some` only for text with a non-blank character.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), CommentError> {
    if value.chars().count() > max {
        return Err(CommentError::TooLong { field, max });
    }
    Ok(())
}
