use weld_data::aggregator::ProgressEvent;

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Total width in columns of the bar portion (excluding label).
    pub width: usize,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
    /// Whether to append the `processed/total` counts after the percentage.
    pub show_counts: bool,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            show_counts: true,
        }
    }
}

// ── BatchProgressBar ─────────────────────────────────────────────────────────

/// Single-line progress bar for a running batch, e.g.
/// `[████████░░░░░░░░] 50.0% (6/12)`.
pub struct BatchProgressBar {
    /// Completion, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    /// Files finished so far.
    pub processed: usize,
    /// Files in the batch.
    pub total: usize,
    /// Visual configuration.
    pub config: ProgressBarConfig,
}

impl BatchProgressBar {
    pub fn new(processed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            ((processed as f64 / total as f64) * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            percentage,
            processed,
            total,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn from_event(event: &ProgressEvent) -> Self {
        let mut bar = Self::new(event.processed, event.total);
        bar.percentage = event.percent();
        bar
    }

    pub fn to_line(&self) -> String {
        let filled = ((self.percentage / 100.0) * self.config.width as f64) as usize;
        let filled = filled.min(self.config.width);
        let empty = self.config.width - filled;

        let mut line = String::with_capacity(self.config.width * 3 + 24);
        line.push('[');
        line.extend(std::iter::repeat(self.config.filled_char).take(filled));
        line.extend(std::iter::repeat(self.config.empty_char).take(empty));
        line.push_str(&format!("] {:.1}%", self.percentage));
        if self.config.show_counts {
            line.push_str(&format!(" ({}/{})", self.processed, self.total));
        }
        line
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
