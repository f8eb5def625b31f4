/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    /// Span of `duration_ms` starting at `start`. Negative durations collapse
    /// to an instant.
    pub fn starting_at(start: Time, duration_ms: f64) -> Self {
        Self {
            start,
            end: Time(start.0 + duration_ms.max(0.0) / 1000.0),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Normalized progress of `t` through the span, clamped to `[0, 1]`.
    ///
    /// An instant span is complete at (and after) its start.
    pub fn progress(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return if t.0 >= self.start.0 { 1.0 } else { 0.0 };
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, t: Time) -> bool {
        self.progress(t) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn progress_is_clamped() {
        let span = TimeSpan::starting_at(Time(1.0), 500.0);
        assert_eq!(span.progress(Time(0.0)), 0.0);
        assert_eq!(span.progress(Time(1.25)), 0.5);
        assert_eq!(span.progress(Time(9.0)), 1.0);
        assert!(span.is_complete(Time(1.5)));
    }

    #[test]
    fn instant_completes_immediately() {
        let span = TimeSpan::instant(Time(2.0));
        assert_eq!(span.duration(), 0.0);
        assert!(span.is_complete(Time(2.0)));
        assert!(!span.is_complete(Time(1.0)));
    }
}
