//! Core types for Threadcast

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// A validated post waiting to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    text: String,
    reply_to: Option<String>,
}

impl PostRequest {
    /// Build a request, rejecting empty text and text over `limit` characters
    pub fn new(text: impl Into<String>, reply_to: Option<String>, limit: Option<usize>) -> Result<Self> {
        let text = text.into();
        validate_text(&text, limit)?;
        Ok(Self { text, reply_to })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}

/// Check post text against emptiness and a character limit
///
/// Counts Unicode scalar values, not bytes.
pub fn validate_text(text: &str, limit: Option<usize>) -> Result<()> {
    if text.trim().is_empty() {
        return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
    }

    if let Some(limit) = limit {
        let count = text.chars().count();
        if count > limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds {} character limit (got {} characters)",
                limit, count
            ))
            .into());
        }
    }

    Ok(())
}

/// Outcome of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostResult {
    Success {
        post_id: String,
        text: String,
        reply_to: Option<String>,
    },
    Failure {
        /// HTTP status, or 0 when no response was received
        status_code: u16,
        text: String,
        reply_to: Option<String>,
        response_body: String,
    },
}

impl PostResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PostResult::Success { .. })
    }

    pub fn post_id(&self) -> Option<&str> {
        match self {
            PostResult::Success { post_id, .. } => Some(post_id),
            PostResult::Failure { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            PostResult::Success { text, .. } | PostResult::Failure { text, .. } => text,
        }
    }

    pub fn reply_to(&self) -> Option<&str> {
        match self {
            PostResult::Success { reply_to, .. } | PostResult::Failure { reply_to, .. } => {
                reply_to.as_deref()
            }
        }
    }
}

/// An account to follow, by handle and optionally by known id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowTarget {
    pub handle: String,
    pub user_id: Option<String>,
}

/// Relationship flags returned by a follow call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStatus {
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub pending_follow: bool,
}

/// What happened to one follow target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FollowOutcome {
    Followed {
        handle: String,
        user_id: String,
        following: bool,
        pending: bool,
    },
    /// The follow call itself was refused
    Rejected { handle: String, reason: String },
    /// The follow call was never made (lookup miss, no source account)
    Skipped { handle: String, reason: String },
}

impl FollowOutcome {
    pub fn handle(&self) -> &str {
        match self {
            FollowOutcome::Followed { handle, .. }
            | FollowOutcome::Rejected { handle, .. }
            | FollowOutcome::Skipped { handle, .. } => handle,
        }
    }
}
