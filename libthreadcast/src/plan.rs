//! Campaign plans
//!
//! A plan is the ordered list of posts to make, plus the accounts to follow
//! afterwards. Plans are written in TOML:
//!
//! ```toml
//! name = "Safe Ecosystem Engagement"
//! delay = "5m"
//!
//! [[post]]
//! text = "Every multisig deserves a transaction firewall."
//! abort_on_failure = true
//!
//! [[post]]
//! text = "What it catches: ..."
//!
//! [[follow]]
//! handle = "safe"
//! user_id = "8467082"
//! ```
//!
//! Each post replies to the most recent successful post of the run unless it
//! names its own `reply_to` or sets `chain = false`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Result, ThreadcastError};
use crate::types::{validate_text, FollowTarget};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(300);
pub const DEFAULT_FOLLOW_DELAY: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    name: String,
    delay: Option<String>,
    thread_root: Option<String>,
    follow_delay: Option<String>,
    #[serde(default, rename = "post")]
    posts: Vec<PostEntryFile>,
    #[serde(default, rename = "follow")]
    follows: Vec<FollowTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostEntryFile {
    text: String,
    #[serde(default)]
    abort_on_failure: bool,
    reply_to: Option<String>,
    #[serde(default = "default_chain")]
    chain: bool,
    delay: Option<String>,
}

fn default_chain() -> bool {
    true
}

/// One post in a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub text: String,
    /// A failure of this entry stops the rest of the plan
    pub abort_on_failure: bool,
    /// Explicit post to reply to; overrides chaining
    pub anchor: Option<String>,
    /// Reply to the last successful post when no anchor is set
    pub chain: bool,
    /// Pause after this entry succeeds; falls back to the plan default
    pub delay: Option<Duration>,
}

impl PlanEntry {
    /// A chained entry with no anchor
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            abort_on_failure: false,
            anchor: None,
            chain: true,
            delay: None,
        }
    }

    pub fn abort_on_failure(mut self) -> Self {
        self.abort_on_failure = true;
        self
    }

    pub fn anchored(mut self, post_id: impl Into<String>) -> Self {
        self.anchor = Some(post_id.into());
        self
    }

    /// Do not reply to anything unless anchored
    pub fn standalone(mut self) -> Self {
        self.chain = false;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignPlan {
    pub name: String,
    pub entries: Vec<PlanEntry>,
    pub default_delay: Duration,
    /// Existing post the thread continues from
    pub thread_root: Option<String>,
    pub follow_delay: Duration,
    pub follows: Vec<FollowTarget>,
}

impl CampaignPlan {
    pub fn new(name: impl Into<String>, entries: Vec<PlanEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
            default_delay: DEFAULT_DELAY,
            thread_root: None,
            follow_delay: DEFAULT_FOLLOW_DELAY,
            follows: Vec::new(),
        }
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_thread_root(mut self, post_id: impl Into<String>) -> Self {
        self.thread_root = Some(post_id.into());
        self
    }

    pub fn with_follows(mut self, follows: Vec<FollowTarget>, delay: Duration) -> Self {
        self.follows = follows;
        self.follow_delay = delay;
        self
    }

    /// Read and validate a plan file against a platform character limit
    pub fn load(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadError)?;
        Self::from_toml_str(&content, limit)
    }

    pub fn from_toml_str(content: &str, limit: Option<usize>) -> Result<Self> {
        let file: PlanFile = toml::from_str(content).map_err(ConfigError::ParseError)?;

        let entries = file
            .posts
            .into_iter()
            .enumerate()
            .map(|(index, post)| -> Result<PlanEntry> {
                Ok(PlanEntry {
                    text: post.text,
                    abort_on_failure: post.abort_on_failure,
                    anchor: post.reply_to,
                    chain: post.chain,
                    delay: post
                        .delay
                        .as_deref()
                        .map(|d| parse_delay(&format!("post[{}].delay", index), d))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let plan = Self {
            name: file.name,
            entries,
            default_delay: parse_optional_delay("delay", file.delay.as_deref(), DEFAULT_DELAY)?,
            thread_root: file.thread_root,
            follow_delay: parse_optional_delay(
                "follow_delay",
                file.follow_delay.as_deref(),
                DEFAULT_FOLLOW_DELAY,
            )?,
            follows: file.follows,
        };

        plan.validate(limit)?;
        Ok(plan)
    }

    /// Check every entry before anything is posted
    pub fn validate(&self, limit: Option<usize>) -> Result<()> {
        if self.entries.is_empty() && self.follows.is_empty() {
            return Err(ThreadcastError::InvalidInput(format!(
                "plan '{}' has no posts and no follows",
                self.name
            )));
        }

        for (index, entry) in self.entries.iter().enumerate() {
            validate_text(&entry.text, limit).map_err(|e| {
                ThreadcastError::InvalidInput(format!("post {}: {}", index + 1, e))
            })?;
            if let Some(anchor) = &entry.anchor {
                check_post_id(&format!("post {} reply_to", index + 1), anchor)?;
            }
        }

        if let Some(root) = &self.thread_root {
            check_post_id("thread_root", root)?;
        }

        for target in &self.follows {
            if target.handle.trim().is_empty() {
                return Err(ThreadcastError::InvalidInput(
                    "follow entry with an empty handle".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Pause to take after `entry` succeeds
    pub fn delay_after(&self, entry: &PlanEntry) -> Duration {
        entry.delay.unwrap_or(self.default_delay)
    }
}

fn check_post_id(field: &str, id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a numeric post id", id),
        }
        .into());
    }
    Ok(())
}

fn parse_delay(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}': {}", value, e),
        }
        .into()
    })
}

fn parse_optional_delay(field: &str, value: Option<&str>, default: Duration) -> Result<Duration> {
    value.map_or(Ok(default), |v| parse_delay(field, v))
}
