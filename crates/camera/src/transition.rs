use foundation::{Time, TimeSpan};

use crate::transform::ViewTransform;

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_cubic_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

/// An animated move between two views.
///
/// A new transition has no start time; the first frame that anchors it
/// becomes its start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub duration_ms: f64,
    span: Option<TimeSpan>,
}

impl Transition {
    pub fn starting_next_frame(from: ViewTransform, to: ViewTransform, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            span: None,
        }
    }

    /// Fixes the start time if it is not set yet.
    pub fn anchor(&mut self, t: Time) -> TimeSpan {
        let duration_ms = self.duration_ms;
        *self
            .span
            .get_or_insert_with(|| TimeSpan::starting_at(t, duration_ms))
    }

    /// View at time `t`; equals `to` once the span has elapsed. An unanchored
    /// transition is still at `from`.
    pub fn sample(&self, t: Time) -> ViewTransform {
        let Some(span) = self.span else {
            return if self.duration_ms <= 0.0 { self.to } else { self.from };
        };
        if span.is_complete(t) {
            return self.to;
        }
        let e = ease_cubic_out(span.progress(t));
        ViewTransform::new(
            lerp(self.from.x, self.to.x, e),
            lerp(self.from.y, self.to.y, e),
            lerp(self.from.k, self.to.k, e),
        )
    }

    pub fn is_complete(&self, t: Time) -> bool {
        self.span.is_some_and(|span| span.is_complete(t))
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::{Transition, ease_cubic_out};
    use crate::transform::ViewTransform;
    use foundation::Time;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_cubic_out(0.0), 0.0);
        assert_eq!(ease_cubic_out(1.0), 1.0);
        assert!(ease_cubic_out(0.5) > 0.5);
    }

    #[test]
    fn transition_lands_on_target() {
        let to = ViewTransform::new(-100.0, 40.0, 4.0);
        let mut tr = Transition::starting_next_frame(ViewTransform::IDENTITY, to, 300.0);
        tr.anchor(Time::from_millis(1000.0));
        assert_eq!(tr.sample(Time::from_millis(1000.0)), ViewTransform::IDENTITY);
        let mid = tr.sample(Time::from_millis(1150.0));
        assert!(mid.k > 1.0 && mid.k < 4.0);
        assert_eq!(tr.sample(Time::from_millis(1300.0)), to);
        assert!(tr.is_complete(Time::from_millis(1400.0)));
    }

    #[test]
    fn zero_duration_is_instant() {
        let to = ViewTransform::new(1.0, 2.0, 3.0);
        let mut tr = Transition::starting_next_frame(ViewTransform::IDENTITY, to, 0.0);
        assert_eq!(tr.sample(Time(5.0)), to);
        tr.anchor(Time(5.0));
        assert_eq!(tr.sample(Time(5.0)), to);
    }

    #[test]
    fn unanchored_transition_starts_on_first_frame() {
        let to = ViewTransform::new(0.0, 0.0, 2.0);
        let mut tr = Transition::starting_next_frame(ViewTransform::IDENTITY, to, 120.0);
        assert_eq!(tr.sample(Time(10.0)), ViewTransform::IDENTITY);
        assert!(!tr.is_complete(Time(10.0)));

        tr.anchor(Time(10.0));
        assert_eq!(tr.anchor(Time(50.0)).start, Time(10.0));
        let mid = tr.sample(Time(10.06));
        assert!(mid.k > 1.0 && mid.k < 2.0);
        assert!(tr.is_complete(Time(10.2)));
    }
}
