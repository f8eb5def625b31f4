use crate::transform::ViewTransform;

/// Differences below these in every component count as the same view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HistoryThresholds {
    pub translate_px: f64,
    pub scale: f64,
}

impl Default for HistoryThresholds {
    fn default() -> Self {
        Self {
            translate_px: 1.0,
            scale: 0.01,
        }
    }
}

impl HistoryThresholds {
    pub fn same_view(&self, a: &ViewTransform, b: &ViewTransform) -> bool {
        (a.x - b.x).abs() < self.translate_px
            && (a.y - b.y).abs() < self.translate_px
            && (a.k - b.k).abs() < self.scale
    }
}

/// Linear undo stack of views.
#[derive(Debug, Clone, Default)]
pub struct ViewHistory {
    entries: Vec<ViewTransform>,
    index: Option<usize>,
    thresholds: HistoryThresholds,
}

impl ViewHistory {
    pub fn new(thresholds: HistoryThresholds) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            thresholds,
        }
    }

    /// Records a view. Near-duplicates of the current entry are ignored;
    /// otherwise entries after the current one are discarded first.
    /// Returns whether an entry was added.
    pub fn push(&mut self, transform: ViewTransform) -> bool {
        if let Some(current) = self.current() {
            if self.thresholds.same_view(&current, &transform) {
                return false;
            }
        }
        let keep = self.index.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(transform);
        self.index = Some(self.entries.len() - 1);
        true
    }

    /// Steps back one entry; `None` at the oldest entry.
    pub fn back(&mut self) -> Option<ViewTransform> {
        let i = self.index.filter(|i| *i > 0)? - 1;
        self.index = Some(i);
        self.entries.get(i).copied()
    }

    /// Steps forward one entry; `None` at the newest entry.
    pub fn forward(&mut self) -> Option<ViewTransform> {
        let i = self.index? + 1;
        let t = self.entries.get(i).copied()?;
        self.index = Some(i);
        Some(t)
    }

    pub fn current(&self) -> Option<ViewTransform> {
        self.index.and_then(|i| self.entries.get(i).copied())
    }

    /// Position of the current entry, or -1 when empty.
    pub fn index(&self) -> isize {
        self.index.map_or(-1, |i| i as isize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryThresholds, ViewHistory};
    use crate::transform::ViewTransform;

    fn t(x: f64, y: f64, k: f64) -> ViewTransform {
        ViewTransform::new(x, y, k)
    }

    #[test]
    fn empty_history_has_no_position() {
        let mut h = ViewHistory::default();
        assert_eq!(h.index(), -1);
        assert_eq!(h.back(), None);
        assert_eq!(h.forward(), None);
    }

    #[test]
    fn near_identical_pushes_are_deduplicated() {
        let mut h = ViewHistory::new(HistoryThresholds::default());
        assert!(h.push(t(10.0, 10.0, 2.0)));
        assert!(!h.push(t(10.5, 9.2, 2.005)));
        assert_eq!(h.len(), 1);
        assert!(h.push(t(11.0, 10.0, 2.0)));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn back_then_forward_restores_view() {
        let mut h = ViewHistory::new(HistoryThresholds::default());
        h.push(ViewTransform::IDENTITY);
        h.push(t(-200.0, -80.0, 3.0));
        assert_eq!(h.back(), Some(ViewTransform::IDENTITY));
        assert_eq!(h.forward(), Some(t(-200.0, -80.0, 3.0)));
        assert_eq!(h.current(), Some(t(-200.0, -80.0, 3.0)));
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut h = ViewHistory::new(HistoryThresholds::default());
        h.push(t(0.0, 0.0, 1.0));
        h.push(t(50.0, 0.0, 1.0));

        assert_eq!(h.forward(), None);
        assert_eq!(h.index(), 1);
        assert_eq!(h.back(), Some(t(0.0, 0.0, 1.0)));
        assert_eq!(h.back(), None);
        assert_eq!(h.index(), 0);
        assert_eq!(h.current(), Some(t(0.0, 0.0, 1.0)));
    }

    #[test]
    fn push_after_back_truncates_forward_entries() {
        let mut h = ViewHistory::new(HistoryThresholds::default());
        h.push(t(0.0, 0.0, 1.0));
        h.push(t(10.0, 0.0, 1.0));
        h.push(t(20.0, 0.0, 1.0));
        h.back();
        h.back();
        assert!(h.push(t(0.0, 40.0, 1.0)));
        assert_eq!(h.len(), 2);
        assert!(!h.can_go_forward());
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn dedup_compares_against_current_entry() {
        let mut h = ViewHistory::new(HistoryThresholds::default());
        h.push(t(0.0, 0.0, 1.0));
        h.push(t(100.0, 0.0, 1.0));
        h.back();
        // Re-arriving at the current entry after an animated step back.
        assert!(!h.push(t(0.2, 0.0, 1.0)));
        assert!(h.can_go_forward());
    }
}
