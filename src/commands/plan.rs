//! `topicsync plan` - preview an apply without changing anything.

use crate::Context;
use crate::cli::PlanArgs;
use crate::commands::{connect, load_declarations, print_header, run_options};
use crate::config::Settings;
use crate::ui;
use anyhow::Result;
use colored::Colorize;
use reconcile::{Action, PlannedTopic, Reconciler};
use serde::Serialize;

#[derive(Serialize)]
struct PlanOutput<'a> {
    observed: usize,
    marked: &'a [String],
    topics: &'a [PlannedTopic],
}

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let settings = Settings::resolve(&args.run)?;
    if !args.json {
        print_header(ctx, "Topic Plan", &settings);
    }

    let build = load_declarations(&settings.target)?;
    for dropped in &build.report.dropped {
        log::warn!("Skipping {dropped}");
    }

    let admin = connect(&settings)?;
    let reconciler = Reconciler::prepare(admin.as_ref(), build.desired, run_options(&settings))?;
    let planned = reconciler.preview();

    if args.json {
        let output = PlanOutput {
            observed: reconciler.snapshot().len(),
            marked: reconciler.marked(),
            topics: &planned,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    ui::section("Planned changes");
    if planned.is_empty() {
        ui::info("No topics declared");
        return Ok(());
    }

    for topic in &planned {
        render_topic(topic);
    }

    if reconciler.options().strict && reconciler.options().validate && !reconciler.marked().is_empty() {
        println!();
        ui::info(&format!(
            "{} marked for deletion (not deleted in validate mode)",
            ui::count(reconciler.marked().len(), "topic")
        ));
    }

    println!();
    let (ok, blocked): (Vec<_>, Vec<_>) = planned.iter().partition(|t| t.error.is_none());
    let changing = ok
        .iter()
        .filter(|t| t.action != Action::Alter || !t.changes.is_empty())
        .count();
    ui::kv("Changing", &ui::count(changing, "topic"));
    ui::kv("Unchanged", &ui::count(ok.len() - changing, "topic"));
    if !blocked.is_empty() {
        ui::kv("Blocked", &ui::count(blocked.len(), "topic"));
    }
    Ok(())
}

fn render_topic(topic: &PlannedTopic) {
    let marker = match topic.action {
        Action::Create => "+".green(),
        Action::Alter => "~".yellow(),
        Action::ValidateOnly => "?".blue(),
        Action::Delete => "-".red(),
    };
    println!("  {} {} {}", marker, topic.action, topic.topic.bold());

    if let Some(error) = &topic.error {
        println!("      {} {}", "✗".red(), error);
    }
    for change in &topic.changes {
        let current = change.current.as_deref().unwrap_or("<default>");
        ui::dim(&format!("    {}: {} → {}", change.key, current, change.submitted));
    }
}
