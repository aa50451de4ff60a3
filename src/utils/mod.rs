use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}

// ── Display formatting ────────────────────────────────────────────────────────

/// "119.58" — billions with two decimals, no unit.
pub fn fmt_billions(value: f64) -> String {
    format!("{value:.2}")
}

/// "$119.58B" — currency in billions.
pub fn fmt_currency(value: f64) -> String {
    format!("${value:.2}B")
}

/// "+2.07%" / "-1.50%" — signed percentage.
pub fn fmt_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(fmt_billions(119.578), "119.58");
        assert_eq!(fmt_currency(85.7), "$85.70B");
        assert_eq!(fmt_pct(2.074), "+2.07%");
        assert_eq!(fmt_pct(-17.5), "-17.50%");
        assert_eq!(fmt_pct(0.0), "+0.00%");
    }

    #[test]
    fn test_timer_elapsed() {
        let t = Timer::start("noop");
        assert!(t.elapsed() < Duration::from_secs(1));
    }
}
