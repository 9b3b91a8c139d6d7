//! Threadcast - post scripted threads and replies to X
//!
//! Loads credentials and a campaign plan, posts the plan's entries one at a
//! time with fixed pauses between them, follows accounts, and writes a
//! report plus a JSON dump of every result.

pub mod config;
pub mod credentials;
pub mod delay;
pub mod error;
pub mod follow;
pub mod logging;
pub mod plan;
pub mod platforms;
pub mod report;
pub mod sequencer;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{CredentialStore, OAuth1Credentials};
pub use error::{Result, ThreadcastError};
pub use plan::{CampaignPlan, PlanEntry};
pub use sequencer::{CampaignRun, CampaignSequencer};
pub use types::{FollowOutcome, FollowTarget, PostRequest, PostResult};
