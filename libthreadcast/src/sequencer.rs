//! Campaign sequencing
//!
//! Posts a plan's entries strictly in order, one request at a time. Each
//! chained entry replies to the most recent successful post of the run, so a
//! failed post is skipped over rather than replied to. After a success the
//! sequencer pauses before the next entry; after a failure it moves on
//! immediately, or stops entirely when the entry is marked
//! `abort_on_failure`.

use tracing::{info, warn};

use crate::delay::Delay;
use crate::error::Result;
use crate::follow;
use crate::plan::{CampaignPlan, PlanEntry};
use crate::platforms::Platform;
use crate::types::{FollowOutcome, PostRequest, PostResult};

/// Called with the entry index and result as soon as each post completes
pub type ResultObserver = Box<dyn Fn(usize, &PostResult) + Send + Sync>;

/// Everything one run produced, in attempt order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRun {
    pub results: Vec<PostResult>,
    /// A mandatory entry failed and the rest of the plan was not attempted
    pub aborted: bool,
}

impl CampaignRun {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn successes(&self) -> impl Iterator<Item = &PostResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }
}

/// Pick the post an entry replies to
///
/// An explicit anchor wins; otherwise a chained entry follows `last_good`.
pub fn resolve_reply_to(entry: &PlanEntry, last_good: Option<&str>) -> Option<String> {
    match (&entry.anchor, entry.chain) {
        (Some(anchor), _) => Some(anchor.clone()),
        (None, true) => last_good.map(str::to_string),
        (None, false) => None,
    }
}

pub struct CampaignSequencer {
    platform: Box<dyn Platform>,
    delay: Box<dyn Delay>,
    observer: Option<ResultObserver>,
}

impl CampaignSequencer {
    pub fn new(platform: Box<dyn Platform>, delay: Box<dyn Delay>) -> Self {
        Self {
            platform,
            delay,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: ResultObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Post every entry of `plan` in order
    ///
    /// # Errors
    ///
    /// Fails before the first request if any entry is invalid for the
    /// platform. Submission failures are returned as `PostResult::Failure`
    /// entries, never as errors.
    pub async fn run(&self, plan: &CampaignPlan) -> Result<CampaignRun> {
        let limit = self.platform.character_limit();
        plan.validate(limit)?;

        let total = plan.entries.len();
        let mut results = Vec::with_capacity(total);
        let mut last_good = plan.thread_root.clone();

        info!(
            "Starting campaign '{}' on {}: {} post(s)",
            plan.name,
            self.platform.name(),
            total
        );

        for (index, entry) in plan.entries.iter().enumerate() {
            let reply_to = resolve_reply_to(entry, last_good.as_deref());
            let request = PostRequest::new(entry.text.clone(), reply_to, limit)?;

            let result = self.platform.submit(&request).await;
            match &result {
                PostResult::Success { post_id, reply_to, .. } => {
                    info!(
                        "Posted {}/{}: id={} reply_to={:?}",
                        index + 1,
                        total,
                        post_id,
                        reply_to
                    );
                    last_good = Some(post_id.clone());
                }
                PostResult::Failure {
                    status_code,
                    response_body,
                    ..
                } => {
                    warn!(
                        "Post {}/{} failed ({}): {}",
                        index + 1,
                        total,
                        status_code,
                        response_body
                    );
                }
            }

            if let Some(observer) = &self.observer {
                observer(index, &result);
            }

            let succeeded = result.is_success();
            results.push(result);

            if !succeeded && entry.abort_on_failure {
                warn!(
                    "Post {} is mandatory; stopping with {} post(s) not attempted",
                    index + 1,
                    total - index - 1
                );
                return Ok(CampaignRun {
                    results,
                    aborted: true,
                });
            }

            if succeeded && index + 1 < total {
                let delay = plan.delay_after(entry);
                info!(
                    "Waiting {} before the next post",
                    humantime::format_duration(delay)
                );
                self.delay.wait(delay).await;
            }
        }

        Ok(CampaignRun {
            results,
            aborted: false,
        })
    }

    /// Run the plan's follow phase after its configured pause
    pub async fn follow(&self, plan: &CampaignPlan, source_user_id: Option<&str>) -> Vec<FollowOutcome> {
        if plan.follows.is_empty() {
            return Vec::new();
        }

        info!(
            "Waiting {} before following {} account(s)",
            humantime::format_duration(plan.follow_delay),
            plan.follows.len()
        );
        self.delay.wait(plan.follow_delay).await;

        follow::follow_all(self.platform.as_ref(), source_user_id, &plan.follows).await
    }
}
