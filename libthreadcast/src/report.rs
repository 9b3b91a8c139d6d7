//! Run reports
//!
//! Rendering is pure: the same results and context always produce the same
//! bytes. Writing replaces both files wholesale.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::types::{FollowOutcome, PostResult};

/// Fixed facts about the run that appear in the report header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub title: String,
    pub campaign: String,
    pub account: String,
    pub permalink_host: String,
    pub generated_at: DateTime<Utc>,
    pub aborted: bool,
}

/// Report document and structured dump, ready to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub report: String,
    pub dump: String,
}

/// `https://<host>/<account>/status/<id>`
pub fn permalink(host: &str, account: &str, post_id: &str) -> String {
    format!("https://{}/{}/status/{}", host, account, post_id)
}

/// Permalinks of every successful post, in order
pub fn permalinks(context: &ReportContext, results: &[PostResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(PostResult::post_id)
        .map(|id| permalink(&context.permalink_host, &context.account, id))
        .collect()
}

/// Serialize results for a follow-up process; order is preserved
pub fn render_dump(results: &[PostResult]) -> Result<String> {
    let mut dump = serde_json::to_string_pretty(results).map_err(ReportError::Serialize)?;
    dump.push('\n');
    Ok(dump)
}

/// Read a dump written by [`render_dump`]
pub fn parse_dump(dump: &str) -> Result<Vec<PostResult>> {
    Ok(serde_json::from_str(dump).map_err(ReportError::Serialize)?)
}

pub struct ResultReporter;

impl ResultReporter {
    pub fn render(
        context: &ReportContext,
        results: &[PostResult],
        follows: &[FollowOutcome],
    ) -> Result<Rendered> {
        let dump = render_dump(results)?;
        let mut report = render_report(context, results, follows);
        if context.aborted {
            render_error_section(&mut report, &dump);
        }
        Ok(Rendered { report, dump })
    }

    /// Overwrite the report and dump files, creating parent directories
    pub fn write(rendered: &Rendered, report_path: &Path, dump_path: &Path) -> Result<()> {
        write_file(report_path, &rendered.report)?;
        write_file(dump_path, &rendered.dump)?;
        tracing::debug!(
            "Wrote report to {} and dump to {}",
            report_path.display(),
            dump_path.display()
        );
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(ReportError::Io)?;
        }
    }
    std::fs::write(path, content).map_err(ReportError::Io)?;
    Ok(())
}

fn render_header(out: &mut String, context: &ReportContext) {
    // Writing to a String cannot fail
    let _ = writeln!(out, "# {}\n", context.title);
    let _ = writeln!(
        out,
        "**Date:** {}",
        context.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "**Account:** @{}", context.account);
    let _ = writeln!(out, "**Campaign:** {}\n", context.campaign);
}

/// Appended after the per-post sections when a mandatory post failed
fn render_error_section(out: &mut String, dump: &str) {
    out.push_str("## Error\n");
    out.push_str("A mandatory post failed; the rest of the campaign was not attempted. Check credentials.\n\n");
    let _ = write!(out, "```json\n{}```\n", dump);
}

fn render_report(context: &ReportContext, results: &[PostResult], follows: &[FollowOutcome]) -> String {
    let mut out = String::new();
    render_header(&mut out, context);

    out.push_str("## Thread Posted\n\n");
    for (index, result) in results.iter().enumerate() {
        let n = index + 1;
        match result {
            PostResult::Success {
                post_id,
                text,
                reply_to,
            } => {
                let _ = writeln!(out, "### Post {}", n);
                let _ = writeln!(out, "- **ID:** {}", post_id);
                let _ = writeln!(
                    out,
                    "- **URL:** {}",
                    permalink(&context.permalink_host, &context.account, post_id)
                );
                if let Some(reply_to) = reply_to {
                    let _ = writeln!(out, "- **Reply to:** {}", reply_to);
                }
                let _ = write!(out, "- **Text:**\n```\n{}\n```\n\n", text);
            }
            PostResult::Failure {
                status_code,
                response_body,
                ..
            } => {
                let _ = writeln!(out, "### Post {} — FAILED", n);
                let _ = writeln!(out, "- **Error:** {}", status_code);
                let _ = write!(out, "- **Response:** {}\n\n", response_body);
            }
        }
    }

    if !follows.is_empty() {
        out.push_str("## Follows\n\n");
        for outcome in follows {
            match outcome {
                FollowOutcome::Followed {
                    handle,
                    user_id,
                    following,
                    pending,
                } => {
                    let _ = writeln!(
                        out,
                        "- @{} ({}): following={}, pending={}",
                        handle, user_id, following, pending
                    );
                }
                FollowOutcome::Rejected { handle, reason } => {
                    let _ = writeln!(out, "- @{}: rejected: {}", handle, reason);
                }
                FollowOutcome::Skipped { handle, reason } => {
                    let _ = writeln!(out, "- @{}: skipped: {}", handle, reason);
                }
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn context(aborted: bool) -> ReportContext {
        ReportContext {
            title: "X Marketing Campaign Log".to_string(),
            campaign: "Safe Ecosystem Engagement".to_string(),
            account: "beto_neh".to_string(),
            permalink_host: "x.com".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap(),
            aborted,
        }
    }

    fn results() -> Vec<PostResult> {
        vec![
            PostResult::Success {
                post_id: "1".to_string(),
                text: "A".to_string(),
                reply_to: None,
            },
            PostResult::Failure {
                status_code: 500,
                text: "B".to_string(),
                reply_to: Some("1".to_string()),
                response_body: "{\"title\":\"Internal Error\"}".to_string(),
            },
            PostResult::Success {
                post_id: "3".to_string(),
                text: "C".to_string(),
                reply_to: Some("1".to_string()),
            },
        ]
    }

    #[test]
    fn test_permalink_format() {
        assert_eq!(
            permalink("x.com", "beto_neh", "100"),
            "https://x.com/beto_neh/status/100"
        );
    }

    #[test]
    fn test_permalinks_skip_failures() {
        assert_eq!(
            permalinks(&context(false), &results()),
            vec![
                "https://x.com/beto_neh/status/1".to_string(),
                "https://x.com/beto_neh/status/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_report_sections() {
        let rendered = ResultReporter::render(&context(false), &results(), &[]).unwrap();
        let report = &rendered.report;

        assert!(report.starts_with("# X Marketing Campaign Log\n\n**Date:** 2026-02-02 09:30 UTC\n"));
        assert!(report.contains("**Account:** @beto_neh\n"));
        assert!(report.contains("### Post 1\n- **ID:** 1\n- **URL:** https://x.com/beto_neh/status/1\n- **Text:**\n```\nA\n```\n"));
        assert!(report.contains("### Post 2 — FAILED\n- **Error:** 500\n- **Response:** {\"title\":\"Internal Error\"}\n"));
        assert!(report.contains("### Post 3\n- **ID:** 3\n- **URL:** https://x.com/beto_neh/status/3\n- **Reply to:** 1\n"));
        assert!(!report.contains("## Follows"));
        assert!(!report.contains("## Error"));
    }

    #[test]
    fn test_report_lists_follows() {
        let follows = vec![
            FollowOutcome::Followed {
                handle: "safe".to_string(),
                user_id: "8467082".to_string(),
                following: true,
                pending: false,
            },
            FollowOutcome::Skipped {
                handle: "safegov".to_string(),
                reason: "user lookup found no account".to_string(),
            },
        ];
        let rendered = ResultReporter::render(&context(false), &results(), &follows).unwrap();

        assert!(rendered.report.contains("## Follows\n\n- @safe (8467082): following=true, pending=false\n"));
        assert!(rendered.report.contains("- @safegov: skipped: user lookup found no account\n"));
    }

    #[test]
    fn test_error_report_embeds_dump() {
        let failed = vec![PostResult::Failure {
            status_code: 403,
            text: "A".to_string(),
            reply_to: None,
            response_body: "Forbidden".to_string(),
        }];
        let rendered = ResultReporter::render(&context(true), &failed, &[]).unwrap();

        assert!(rendered.report.contains("### Post 1 — FAILED\n- **Error:** 403\n"));
        assert!(rendered.report.contains("## Error\n"));
        assert!(rendered.report.ends_with(&format!("```json\n{}```\n", rendered.dump)));
    }

    #[test]
    fn test_error_report_keeps_posts_sent_before_the_abort() {
        let partial = vec![
            PostResult::Success {
                post_id: "100".to_string(),
                text: "A".to_string(),
                reply_to: None,
            },
            PostResult::Failure {
                status_code: 403,
                text: "B".to_string(),
                reply_to: Some("100".to_string()),
                response_body: "Forbidden".to_string(),
            },
        ];
        let report = ResultReporter::render(&context(true), &partial, &[])
            .unwrap()
            .report;

        assert!(report.contains("## Thread Posted\n"));
        assert!(report.contains("### Post 1\n- **ID:** 100\n- **URL:** https://x.com/beto_neh/status/100\n"));
        assert!(report.contains("### Post 2 — FAILED\n"));
        let sent = report.find("### Post 1").unwrap();
        let error = report.find("## Error").unwrap();
        assert!(sent < error);
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = ResultReporter::render(&context(false), &results(), &[]).unwrap();
        let second = ResultReporter::render(&context(false), &results(), &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dump_is_lossless() {
        let dump = render_dump(&results()).unwrap();
        assert_eq!(parse_dump(&dump).unwrap(), results());
    }

    #[test]
    fn test_write_overwrites_previous_files() {
        let dir = TempDir::new().unwrap();
        let report_path = dir.path().join("logs").join("campaign.md");
        let dump_path = dir.path().join("thread-results.json");

        let first = ResultReporter::render(&context(false), &results(), &[]).unwrap();
        ResultReporter::write(&first, &report_path, &dump_path).unwrap();

        let second = ResultReporter::render(&context(false), &results()[..1], &[]).unwrap();
        ResultReporter::write(&second, &report_path, &dump_path).unwrap();

        assert_eq!(std::fs::read_to_string(&report_path).unwrap(), second.report);
        assert_eq!(
            parse_dump(&std::fs::read_to_string(&dump_path).unwrap()).unwrap().len(),
            1
        );
    }
}
