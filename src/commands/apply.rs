//! `topicsync apply` - make the cluster match the declarations.

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands::{connect, load_declarations, print_header, run_options, watch_ctrl_c};
use crate::config::Settings;
use crate::progress::TopicProgress;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use dialoguer::Confirm;
use reconcile::{CancelToken, Outcome, Reconciler, RunReport, Status, format_config};

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let settings = Settings::resolve(&args.run)?;
    let chatty = !args.json && !ctx.quiet;
    if !args.json {
        print_header(ctx, "Applying Topics", &settings);
    }

    let build = load_declarations(&settings.target)?;
    let admin = connect(&settings)?;
    let reconciler = Reconciler::prepare(admin.as_ref(), build.desired, run_options(&settings))?
        .with_build_report(build.report);

    if reconciler.deletes() && !args.yes {
        if args.json {
            bail!("Deleting topics with --json requires --yes");
        }
        if !confirm_deletions(reconciler.marked())? {
            ui::info("Aborted, nothing was changed");
            return Ok(());
        }
    }

    let cancel = CancelToken::new();
    watch_ctrl_c(cancel.clone());
    let progress = TopicProgress::new(chatty);
    let report = reconciler.apply(&cancel, &progress)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ctx.quiet {
        render(&report, &settings.brokers, ctx.verbose > 0);
    } else {
        for outcome in report.failures() {
            ui::error(&format!("{}: {}", outcome.topic, outcome.error().unwrap_or_default()));
        }
    }

    if !report.is_success() {
        bail!("{} failed", ui::count(report.summary.failed, "topic"));
    }
    Ok(())
}

fn confirm_deletions(marked: &[String]) -> Result<bool> {
    ui::section("Marked for deletion");
    for name in marked {
        println!("  {} {}", "-".red(), name);
    }
    println!();

    let confirmed = Confirm::new()
        .with_prompt(format!("Delete {}?", ui::count(marked.len(), "topic")))
        .default(false)
        .interact()?;

    Ok(confirmed)
}

/// Lines of the run overview, in display order.
pub(crate) fn overview(report: &RunReport, brokers: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Validate mode", ui::flag(report.validate).to_string()),
        ("Strict mode", ui::flag(report.strict).to_string()),
        ("Brokers", brokers.to_string()),
        ("Topics found", report.observed.len().to_string()),
        ("Topics entries", report.entries.len().to_string()),
        ("Topics marked for deletion", report.marked.len().to_string()),
    ]
}

fn render(report: &RunReport, brokers: &str, verbose: bool) {
    println!();
    ui::divider();
    for (key, value) in overview(report, brokers) {
        ui::kv(key, &value);
    }
    ui::divider();

    if !report.outcomes.is_empty() {
        ui::section("Topics");
        for outcome in &report.outcomes {
            render_outcome(outcome, verbose);
        }
    }

    if !report.deletions.is_empty() {
        ui::section("Deletions");
        for outcome in &report.deletions {
            render_outcome(outcome, verbose);
        }
    }

    if !report.dropped.is_empty() {
        ui::section("Skipped records");
        for dropped in &report.dropped {
            ui::warn(&dropped.to_string());
        }
    }

    if !report.duplicates.is_empty() {
        ui::section("Declared more than once");
        for name in &report.duplicates {
            ui::warn(&format!("{name} (last declaration used)"));
        }
    }

    if report.empty_records > 0 {
        ui::dim(&format!(
            "{} without topic fields ignored",
            ui::count(report.empty_records, "record")
        ));
    }

    if !report.cancelled.is_empty() {
        ui::section("Cancelled");
        for name in &report.cancelled {
            ui::dim(name);
        }
    }

    render_summary(report);
}

fn render_outcome(outcome: &Outcome, verbose: bool) {
    match &outcome.status {
        Status::Succeeded => {
            println!("  {} {} {}", "✓".green(), outcome.action, outcome.topic);
            if verbose && let Some(config) = &outcome.submitted {
                ui::dim(&format!("  {}", format_config(config)));
            }
        }
        Status::Failed { category, error } => {
            println!(
                "  {} {} {}: {}",
                "✗".red(),
                outcome.action,
                outcome.topic,
                category.description()
            );
            ui::dim(&format!("  {error}"));
            ui::dim(&format!("  → {}", category.advice()));
        }
    }
}

fn render_summary(report: &RunReport) {
    let summary = &report.summary;
    println!();
    if summary.created > 0 {
        ui::success(&format!("Created {}", ui::count(summary.created, "topic")));
    }
    if summary.altered > 0 {
        ui::success(&format!("Altered {}", ui::count(summary.altered, "topic")));
    }
    if summary.validated > 0 {
        ui::success(&format!("Validated {}", ui::count(summary.validated, "topic")));
    }
    if summary.deleted > 0 {
        ui::success(&format!("Deleted {}", ui::count(summary.deleted, "topic")));
    }
    if summary.cancelled > 0 {
        ui::warn(&format!("Cancelled {}", ui::count(summary.cancelled, "topic")));
    }
    if summary.failed > 0 {
        ui::error(&format!("Failed {}", ui::count(summary.failed, "topic")));
    }
    if summary.total() == 0 {
        ui::info("No topics declared");
    }
}
