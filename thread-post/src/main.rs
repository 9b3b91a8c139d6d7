//! thread-post - Post a campaign plan as a thread, then follow accounts

use anyhow::Context;
use clap::Parser;
use libthreadcast::delay::{Delay, NoDelay, TokioDelay};
use libthreadcast::logging::{LogFormat, LoggingConfig};
use libthreadcast::platforms::x::XClient;
use libthreadcast::platforms::Platform;
use libthreadcast::report::{self, ReportContext, ResultReporter};
use libthreadcast::{
    CampaignPlan, CampaignSequencer, Config, FollowOutcome, PlanEntry, PostResult, ThreadcastError,
};
use std::path::PathBuf;

/// Characters of post text echoed in status lines
const EXCERPT_LEN: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "thread-post")]
#[command(version, about = "Post a campaign plan as a thread")]
#[command(long_about = r#"Post a campaign plan as a thread, then follow accounts.

Each post in the plan replies to the most recent successful post of the run
unless it names its own reply_to. A post marked abort_on_failure stops the
run when it fails. After every successful post the run pauses for the plan's
delay before the next one.

EXAMPLES:
    # Check config, credentials and plan without posting
    thread-post campaign.toml --dry-run

    # Run the campaign
    thread-post campaign.toml

    # Use a specific config file and JSON logs
    thread-post campaign.toml --config ./threadcast.toml --log-format json

FILES:
    Config: $THREADCAST_CONFIG or ~/.config/threadcast/config.toml
    The report and the JSON dump are overwritten on every run.

EXIT CODES:
    0 - Campaign ran (individual non-mandatory posts may have failed)
    1 - A mandatory post failed, or a runtime error
    2 - Credentials missing or malformed
    3 - Invalid plan
"#)]
struct Cli {
    /// Campaign plan file (TOML)
    plan: PathBuf,

    /// Config file (defaults to $THREADCAST_CONFIG or the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate everything and print the plan without posting
    #[arg(long)]
    dry_run: bool,

    /// Do not pause between posts
    #[arg(long)]
    no_delay: bool,

    /// Do not run the follow phase
    #[arg(long)]
    skip_follows: bool,

    /// Title of the report document
    #[arg(long, default_value = "X Marketing Campaign Log")]
    title: String,

    /// Log output format: text, json or pretty (default: $THREADCAST_LOG_FORMAT, else text)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.log_format, cli.verbose).init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<ThreadcastError>()
        .map(ThreadcastError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let client = XClient::from_config(&config).context("Failed to load credentials")?;
    let plan = CampaignPlan::load(&cli.plan, client.character_limit())
        .with_context(|| format!("Invalid plan {}", cli.plan.display()))?;
    tracing::debug!(
        "Loaded plan '{}' with {} post(s) and {} follow(s)",
        plan.name,
        plan.entries.len(),
        plan.follows.len()
    );

    if cli.dry_run {
        print_plan(&plan);
        return Ok(0);
    }

    let delay: Box<dyn Delay> = if cli.no_delay {
        Box::new(NoDelay)
    } else {
        Box::new(TokioDelay)
    };

    let total = plan.entries.len();
    let sequencer = CampaignSequencer::new(Box::new(client), delay)
        .with_observer(Box::new(move |index: usize, result: &PostResult| {
            print_result(index, total, result)
        }));

    println!("=== {} ===", plan.name);
    let campaign = sequencer.run(&plan).await?;

    let follows = if campaign.aborted {
        Vec::new()
    } else if cli.skip_follows {
        if !plan.follows.is_empty() {
            println!("Skipping {} follow(s)", plan.follows.len());
        }
        Vec::new()
    } else {
        sequencer
            .follow(&plan, config.account.user_id.as_deref())
            .await
    };
    for outcome in &follows {
        print_follow(outcome);
    }

    let context = ReportContext {
        title: cli.title.clone(),
        campaign: plan.name.clone(),
        account: config.account.handle.clone(),
        permalink_host: config.account.permalink_host.clone(),
        generated_at: chrono::Utc::now(),
        aborted: campaign.aborted,
    };
    let rendered = ResultReporter::render(&context, &campaign.results, &follows)?;
    let report_path = config.report_path();
    let dump_path = config.dump_path();
    ResultReporter::write(&rendered, &report_path, &dump_path)?;

    if campaign.aborted {
        println!("\nMandatory post failed. Stopping.");
        println!("Error report saved to {}", report_path.display());
    } else {
        println!(
            "\n=== Campaign complete: {}/{} posted ===",
            campaign.success_count(),
            total
        );
        println!("Results saved to {}", report_path.display());
    }
    println!("Results JSON saved to {}", dump_path.display());

    print_links(&report::permalinks(&context, &campaign.results));

    Ok(if campaign.aborted { 1 } else { 0 })
}

fn print_links(links: &[String]) {
    if links.is_empty() {
        return;
    }
    println!("\n--- POST LINKS ---");
    for link in links {
        println!("{}", link);
    }
}

fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > EXCERPT_LEN {
        format!("{}...", flat.chars().take(EXCERPT_LEN).collect::<String>())
    } else {
        flat
    }
}

fn print_result(index: usize, total: usize, result: &PostResult) {
    match result {
        PostResult::Success { post_id, text, .. } => {
            println!("✅ [{}/{}] Posted {}", index + 1, total, post_id);
            println!("   Text: {}", excerpt(text));
        }
        PostResult::Failure {
            status_code,
            response_body,
            ..
        } => {
            println!(
                "❌ [{}/{}] Failed ({}): {}",
                index + 1,
                total,
                status_code,
                response_body
            );
        }
    }
}

fn print_follow(outcome: &FollowOutcome) {
    match outcome {
        FollowOutcome::Followed {
            handle,
            following,
            pending,
            ..
        } => println!("✅ Follow @{}: following={}, pending={}", handle, following, pending),
        FollowOutcome::Rejected { handle, reason } => println!("⚠️ Follow @{}: {}", handle, reason),
        FollowOutcome::Skipped { handle, reason } => {
            println!("❌ Skipped @{}: {}", handle, reason)
        }
    }
}

fn describe_reply(plan: &CampaignPlan, index: usize, entry: &PlanEntry) -> String {
    match (&entry.anchor, entry.chain) {
        (Some(anchor), _) => format!("replies to {}", anchor),
        (None, false) => "standalone".to_string(),
        (None, true) if index > 0 => "replies to the last successful post".to_string(),
        (None, true) => match &plan.thread_root {
            Some(root) => format!("replies to thread root {}", root),
            None => "starts the thread".to_string(),
        },
    }
}

fn print_plan(plan: &CampaignPlan) {
    println!("Plan: {}", plan.name);
    println!(
        "{} post(s), {} follow(s)",
        plan.entries.len(),
        plan.follows.len()
    );

    for (index, entry) in plan.entries.iter().enumerate() {
        let mandatory = if entry.abort_on_failure { " [mandatory]" } else { "" };
        let pause = if index + 1 < plan.entries.len() {
            format!(
                ", then waits {}",
                humantime::format_duration(plan.delay_after(entry))
            )
        } else {
            String::new()
        };
        println!(
            "{}.{} {}{}",
            index + 1,
            mandatory,
            describe_reply(plan, index, entry),
            pause
        );
        println!("   {}", excerpt(&entry.text));
    }

    if !plan.follows.is_empty() {
        println!(
            "Follows after {}:",
            humantime::format_duration(plan.follow_delay)
        );
        for target in &plan.follows {
            match &target.user_id {
                Some(id) => println!("   @{} ({})", target.handle, id),
                None => println!("   @{} (looked up by handle)", target.handle),
            }
        }
    }
}
