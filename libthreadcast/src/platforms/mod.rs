//! Platform abstraction and implementations
//!
//! A [`Platform`] is the authenticated client the sequencer and the follow
//! phase talk to. [`x::XClient`] speaks the real HTTP API;
//! [`mock::MockPlatform`] replays scripted responses for tests.
//!
//! # Examples
//!
//! ```no_run
//! use libthreadcast::platforms::{Platform, x::XClient};
//! use libthreadcast::types::PostRequest;
//! use libthreadcast::Config;
//!
//! # async fn example() -> libthreadcast::error::Result<()> {
//! let config = Config::load()?;
//! let client = XClient::from_config(&config)?;
//!
//! let request = PostRequest::new("Hello, thread!", None, client.character_limit())?;
//! let result = client.submit(&request).await;
//! if let Some(id) = result.post_id() {
//!     println!("Posted: {}", id);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{validate_text, FollowStatus, PostRequest, PostResult};

pub mod mock;
pub mod oauth;
pub mod x;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Submit one post, making exactly one attempt
    ///
    /// Never fails: every outcome, including transport errors, is classified
    /// into a [`PostResult`]. A `Success` carries the id the platform
    /// returned; a `Failure` never carries an id.
    async fn submit(&self, request: &PostRequest) -> PostResult;

    /// Resolve a handle to a user id
    ///
    /// Returns `Ok(None)` when the platform answers but the handle cannot be
    /// resolved (not found, forbidden).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Network` when no response was received.
    async fn lookup_user(&self, handle: &str) -> Result<Option<String>>;

    /// Make `source_user_id` follow `target_user_id`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Posting` when the platform refuses the follow
    /// and `PlatformError::Network` when no response was received.
    async fn follow(&self, source_user_id: &str, target_user_id: &str) -> Result<FollowStatus>;

    /// Lowercase identifier for logs (e.g., "x", "mock")
    fn name(&self) -> &str;

    /// Maximum characters per post, or `None` for no hard limit
    fn character_limit(&self) -> Option<usize>;

    fn validate_content(&self, content: &str) -> Result<()> {
        validate_text(content, self.character_limit())
    }
}
