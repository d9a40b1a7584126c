//! Progress reporting for an import.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::errors::RestoreError;

/// Minimum time between two log lines.
const LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Percent step that always triggers a log line.
const LOG_STEP_PERCENT: u64 = 5;

/// How progress is surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// Periodic `tracing` info lines.
    #[default]
    Log,
    /// Terminal progress bar.
    Bar,
    /// No output.
    Quiet,
}

impl FromStr for ProgressMode {
    type Err = RestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Self::Log),
            "bar" => Ok(Self::Bar),
            "quiet" => Ok(Self::Quiet),
            other => Err(RestoreError::invalid_config(format!(
                "unknown progress mode '{}', expected 'log', 'bar' or 'quiet'",
                other
            ))),
        }
    }
}

impl fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Log => "log",
            Self::Bar => "bar",
            Self::Quiet => "quiet",
        };
        f.write_str(name)
    }
}

/// Tracks compressed bytes consumed against the declared archive size.
///
/// Updates never fail. The position only moves forward and never exceeds
/// the total when one is known.
pub struct ProgressReporter {
    title: String,
    total: Option<u64>,
    current: u64,
    mode: ProgressMode,
    bar: Option<ProgressBar>,
    started: Instant,
    last_log: Instant,
    last_step: u64,
}

impl ProgressReporter {
    /// Create a reporter. A total of `None` or zero means the size is unknown.
    pub fn new(title: impl Into<String>, total: Option<u64>, mode: ProgressMode) -> Self {
        let title = title.into();
        let total = total.filter(|&t| t > 0);

        let bar = match mode {
            ProgressMode::Bar => {
                let pb = match total {
                    Some(total) => ProgressBar::new(total),
                    None => ProgressBar::new_spinner(),
                };
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb.set_message(title.clone());
                Some(pb)
            }
            _ => None,
        };

        let now = Instant::now();
        Self {
            title,
            total,
            current: 0,
            mode,
            bar,
            started: now,
            last_log: now,
            last_step: 0,
        }
    }

    /// Record the bytes consumed so far.
    pub fn update(&mut self, bytes: u64) {
        let bytes = match self.total {
            Some(total) => bytes.min(total),
            None => bytes,
        };
        if bytes <= self.current {
            return;
        }
        self.current = bytes;

        match self.mode {
            ProgressMode::Bar => {
                if let Some(ref pb) = self.bar {
                    pb.set_position(self.current);
                }
            }
            ProgressMode::Log => self.maybe_log(),
            ProgressMode::Quiet => {}
        }
    }

    /// Bytes consumed so far.
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Completion in percent, when the total is known.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .map(|total| self.current as f64 * 100.0 / total as f64)
    }

    /// Emit the closing line and clear any bar.
    pub fn finish(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message(format!("{} done", self.title));
        }
        if self.mode == ProgressMode::Log {
            info!(
                archive = %self.title,
                bytes = self.current,
                elapsed_secs = self.started.elapsed().as_secs_f64(),
                "Import stream consumed"
            );
        }
    }

    fn maybe_log(&mut self) {
        let step = self
            .percent()
            .map(|p| p as u64 / LOG_STEP_PERCENT)
            .unwrap_or(0);
        let step_crossed = self.total.is_some() && step > self.last_step;
        if !step_crossed && self.last_log.elapsed() < LOG_INTERVAL {
            return;
        }

        self.last_step = step;
        self.last_log = Instant::now();

        match self.percent() {
            Some(percent) => info!(
                archive = %self.title,
                bytes = self.current,
                total = self.total.unwrap_or_default(),
                "Import progress: {:.2}%",
                percent
            ),
            None => info!(
                archive = %self.title,
                bytes = self.current,
                "Import progress: {} bytes",
                self.current
            ),
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.abandon();
        }
    }
}
