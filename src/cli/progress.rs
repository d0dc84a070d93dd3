//! Progress bar for geocoding runs
//!
//! Consumes the coordinator's [`ProgressEvent`]s and renders them on an
//! indicatif bar. The bar hides itself when stderr is not a terminal, and is
//! not drawn at all in quiet or `--no-progress` mode.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::aggregator::RunStats;
use crate::app::coordinator::ProgressEvent;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Renders progress events for one session
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Create a display; a disabled display draws nothing
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden())
        };

        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);

        Self { bar }
    }

    /// Apply one event to the bar
    pub fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started {
                total,
                provider,
                workers,
            } => {
                self.bar.set_length(*total as u64);
                self.bar.set_message(format!(
                    "{} provider, {} workers",
                    provider.service_name(),
                    workers
                ));
            }
            ProgressEvent::Progress(stats) => self.update(stats),
            ProgressEvent::Finished(stats) => {
                self.update(stats);
                self.bar.finish_with_message(Self::message(stats));
            }
        }
    }

    /// Consume events until the coordinator drops its sender
    pub fn spawn(self, mut events: mpsc::Receiver<ProgressEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(&event);
            }
            if !self.bar.is_finished() {
                self.bar.finish_and_clear();
            }
            debug!("Progress display closed");
        })
    }

    fn update(&self, stats: &RunStats) {
        self.bar.set_length(stats.total as u64);
        self.bar.set_position(stats.processed as u64);
        self.bar.set_message(Self::message(stats));
    }

    fn message(stats: &RunStats) -> String {
        format!(
            "hits:{} resolved:{} misses:{}",
            stats.cache_hits, stats.resolved, stats.misses
        )
    }
}
