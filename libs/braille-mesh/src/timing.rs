//! Stage timing.
//!
//! Enable with `RUST_LOG=braille_mesh::timing=info`.

use std::time::Instant;

use tracing::{debug, info, Span};

/// Times one pipeline stage and logs the duration when dropped.
///
/// ```rust
/// use braille_mesh::timing::StageTimer;
///
/// let timer = StageTimer::new("layout");
/// // ... work ...
/// assert!(timer.elapsed_ms() >= 0.0);
/// ```
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
    span: Span,
}

impl StageTimer {
    pub fn new(stage: &'static str) -> Self {
        let span = tracing::info_span!("stage", stage);
        debug!(target: "braille_mesh::timing", stage, "stage started");
        Self {
            stage,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer was created.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        info!(
            target: "braille_mesh::timing",
            stage = self.stage,
            elapsed_ms = self.elapsed_ms(),
            "stage completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_monotonic() {
        let timer = StageTimer::new("test");
        let first = timer.elapsed_ms();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_ms() > first);
    }
}
