use crate::frame::Frame;

/// How an update reached the screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Applied synchronously at submission.
    Immediate,
    /// Applied on the next animation frame.
    Frame(u64),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    pub submitted: u64,
    /// Coalesced updates replaced by a newer one before any frame ran.
    pub superseded: u64,
    pub applied: u64,
}

/// Cooperative single-slot scheduler for visual updates.
///
/// Discrete actions call [`FrameScheduler::submit_immediate`] and are applied
/// on the spot. Continuous gestures call [`FrameScheduler::submit_coalesced`];
/// only the most recent pending value survives until the next
/// [`FrameScheduler::on_frame`], so at most one coalesced update lands per
/// frame.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    pending: Option<T>,
    last_applied: Option<(T, Delivery)>,
    stats: SchedulerStats,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            pending: None,
            last_applied: None,
            stats: SchedulerStats::default(),
        }
    }
}

impl<T: Clone> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `value` now. A pending coalesced value is dropped since it is
    /// older than this one.
    pub fn submit_immediate(&mut self, value: T) -> T {
        self.stats.submitted += 1;
        if self.pending.take().is_some() {
            self.stats.superseded += 1;
        }
        self.stats.applied += 1;
        self.last_applied = Some((value.clone(), Delivery::Immediate));
        value
    }

    /// Parks `value` until the next frame, replacing any value still waiting.
    pub fn submit_coalesced(&mut self, value: T) {
        self.stats.submitted += 1;
        if self.pending.replace(value).is_some() {
            self.stats.superseded += 1;
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// Runs one animation frame: returns the pending value, if any.
    pub fn on_frame(&mut self, frame: Frame) -> Option<T> {
        let value = self.pending.take()?;
        self.stats.applied += 1;
        self.last_applied = Some((value.clone(), Delivery::Frame(frame.index)));
        Some(value)
    }

    pub fn last_applied(&self) -> Option<&(T, Delivery)> {
        self.last_applied.as_ref()
    }

    /// Drops pending work without applying it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::{Delivery, FrameScheduler};
    use crate::frame::Frame;

    #[test]
    fn coalesces_to_most_recent_value() {
        let mut sched = FrameScheduler::new();
        sched.submit_coalesced(1);
        sched.submit_coalesced(2);
        sched.submit_coalesced(3);

        assert_eq!(sched.on_frame(Frame::fixed(0, 1.0)), Some(3));
        assert_eq!(sched.on_frame(Frame::fixed(1, 1.0)), None);

        let stats = sched.stats();
        assert_eq!(stats.submitted, 3);
        assert_eq!(stats.superseded, 2);
        assert_eq!(stats.applied, 1);
    }

    #[test]
    fn immediate_applies_now_and_drops_pending() {
        let mut sched = FrameScheduler::new();
        sched.submit_coalesced("drag");
        assert_eq!(sched.submit_immediate("reset"), "reset");
        assert!(!sched.has_pending());
        assert_eq!(sched.on_frame(Frame::fixed(0, 1.0)), None);
        assert_eq!(sched.last_applied(), Some(&("reset", Delivery::Immediate)));
    }

    #[test]
    fn records_frame_delivery() {
        let mut sched = FrameScheduler::new();
        sched.submit_coalesced(5u8);
        sched.on_frame(Frame::fixed(42, 0.016));
        assert_eq!(sched.last_applied(), Some(&(5, Delivery::Frame(42))));
    }
}
