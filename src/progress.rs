use crate::bench::Phase;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives phase boundaries and processed counts from the loader.
pub trait ProgressSink {
    fn begin(&mut self, phase: Phase, total: u64);
    fn advance(&mut self, processed: u64);
    fn finish(&mut self, message: &str);
}

/// Discards all updates.
#[derive(Debug, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn begin(&mut self, _phase: Phase, _total: u64) {}
    fn advance(&mut self, _processed: u64) {}
    fn finish(&mut self, _message: &str) {}
}

/// Progress bars on stderr.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>14} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl ProgressSink for TerminalProgress {
    fn begin(&mut self, phase: Phase, total: u64) {
        if let Some(old) = self.bar.take() {
            old.finish_and_clear();
        }
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
        bar.set_style(Self::style());
        bar.set_prefix(phase.name());
        self.bar = Some(bar);
    }

    fn advance(&mut self, processed: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(processed);
        }
    }

    fn finish(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
            eprintln!("{message}");
        }
    }
}

/// Keeps every update, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Recorder {
    pub begun: Vec<(Phase, u64)>,
    pub positions: Vec<u64>,
    pub finished: Vec<String>,
}

#[cfg(test)]
impl ProgressSink for Recorder {
    fn begin(&mut self, phase: Phase, total: u64) {
        self.begun.push((phase, total));
    }

    fn advance(&mut self, processed: u64) {
        self.positions.push(processed);
    }

    fn finish(&mut self, message: &str) {
        self.finished.push(message.to_string());
    }
}
