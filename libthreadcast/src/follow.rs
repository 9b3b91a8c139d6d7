//! Follow phase
//!
//! Runs after the post sequence. Nothing here aborts a run: a target that
//! cannot be resolved is skipped with a warning and a refused follow is
//! recorded, then the next target is tried.

use tracing::{info, warn};

use crate::platforms::Platform;
use crate::types::{FollowOutcome, FollowTarget};

/// Follow every target in order on behalf of `source_user_id`
pub async fn follow_all(
    platform: &dyn Platform,
    source_user_id: Option<&str>,
    targets: &[FollowTarget],
) -> Vec<FollowOutcome> {
    let mut outcomes = Vec::with_capacity(targets.len());

    let Some(source) = source_user_id else {
        for target in targets {
            warn!("Skipping follow of @{}: account.user_id is not configured", target.handle);
            outcomes.push(FollowOutcome::Skipped {
                handle: target.handle.clone(),
                reason: "account.user_id is not configured".to_string(),
            });
        }
        return outcomes;
    };

    for target in targets {
        outcomes.push(follow_one(platform, source, target).await);
    }

    outcomes
}

async fn follow_one(platform: &dyn Platform, source: &str, target: &FollowTarget) -> FollowOutcome {
    let handle = target.handle.clone();

    let user_id = match &target.user_id {
        Some(id) => id.clone(),
        None => match platform.lookup_user(&target.handle).await {
            Ok(Some(id)) => {
                info!("Resolved @{} to {}", target.handle, id);
                id
            }
            Ok(None) => {
                warn!("Could not look up @{}; skipping follow", target.handle);
                return FollowOutcome::Skipped {
                    handle,
                    reason: "user lookup found no account".to_string(),
                };
            }
            Err(e) => {
                warn!("Lookup of @{} failed: {}; skipping follow", target.handle, e);
                return FollowOutcome::Skipped {
                    handle,
                    reason: e.to_string(),
                };
            }
        },
    };

    match platform.follow(source, &user_id).await {
        Ok(status) => {
            info!(
                "Follow @{}: following={}, pending={}",
                target.handle, status.following, status.pending_follow
            );
            FollowOutcome::Followed {
                handle,
                user_id,
                following: status.following,
                pending: status.pending_follow,
            }
        }
        Err(e) => {
            warn!("Follow @{} failed: {}", target.handle, e);
            FollowOutcome::Rejected {
                handle,
                reason: e.to_string(),
            }
        }
    }
}
