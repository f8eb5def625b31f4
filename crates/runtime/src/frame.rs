use foundation::time::Time;

/// Animation frame metadata.
///
/// Display frames arrive at whatever cadence the host provides, so a frame
/// carries its own timestamp rather than deriving it from a fixed step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Host time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, time: Time) -> Self {
        Self { index, time }
    }

    /// Frame `index` of a fixed-rate clock ticking every `dt_s` seconds.
    pub fn fixed(index: u64, dt_s: f64) -> Self {
        Self::new(index, Time(index as f64 * dt_s))
    }
}
