//! Terminal progress for reconciliation batches.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reconcile::{Action, Outcome, ProgressCallback};
use std::sync::Mutex;

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Progress bar driven by the reconciler.
///
/// Hidden when output is quiet or machine-readable.
pub struct TopicProgress {
    visible: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl TopicProgress {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

fn style() -> ProgressStyle {
    match ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        Ok(style) => style.progress_chars("=>-"),
        Err(e) => {
            log::debug!("Falling back to the default progress style: {e}");
            ProgressStyle::default_bar()
        }
    }
}

impl ProgressCallback for TopicProgress {
    fn on_batch_start(&self, count: usize, label: &str) {
        let bar = ProgressBar::new(count as u64);
        if self.visible {
            bar.set_style(style());
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_message(label.to_string());

        let mut guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(bar);
    }

    fn on_topic_start(&self, topic: &str, action: Action) {
        self.with_bar(|bar| bar.set_message(format!("{action} {topic}")));
    }

    fn on_topic_complete(&self, outcome: &Outcome) {
        self.with_bar(|bar| {
            if let Some(err) = outcome.error() {
                bar.println(format!("  {} {}: {}", "✗".red(), outcome.topic, err));
            }
            bar.inc(1);
        });
    }

    fn on_batch_complete(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_tracks_batches() {
        let progress = TopicProgress::new(false);
        progress.on_batch_start(2, "Applying");
        progress.on_topic_start("orders", Action::Create);
        progress.on_topic_complete(&Outcome::succeeded("orders", Action::Create, None));
        progress.with_bar(|bar| assert_eq!(bar.position(), 1));
        progress.on_batch_complete();

        let guard = progress.bar.lock().unwrap();
        assert!(guard.is_none());
    }
}
