//! Stage and task durations.

use std::time::{Duration, Instant};

use tracing::debug;

/// Measures one stage or task and reports it when finished.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: &str) -> Self {
        Self {
            label: label.to_string(),
            start: Instant::now(),
        }
    }

    /// Print the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        debug!(label = %self.label, elapsed_ms = elapsed.as_millis() as u64, "finished");
        println!("  [{}] {}", format_duration(elapsed), self.label);
        elapsed
    }
}

/// Seconds below a minute, minutes above.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
