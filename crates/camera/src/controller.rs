//! Pan/zoom state machine for the map.
//!
//! Every accepted input produces a [`ViewUpdate`]. Discrete actions (keys,
//! reset, focus, history steps) are `Immediate` and carry a transition
//! duration; continuous gestures (drag, wheel) are `Coalesced`, meaning the
//! caller should draw at most one of them per animation frame.

use foundation::{Aabb2, Time};
use scene::ViewportSize;

use crate::gesture::{GestureEvent, Key, Modifiers, accepts};
use crate::history::{HistoryThresholds, ViewHistory};
use crate::transform::{ScaleExtent, ViewTransform, constrain};

/// A wheel gesture ends after this long without another wheel event.
pub const WHEEL_IDLE_MS: f64 = 150.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionDurations {
    pub keyboard_ms: f64,
    pub history_ms: f64,
    pub reset_ms: f64,
    pub focus_ms: f64,
}

impl Default for TransitionDurations {
    fn default() -> Self {
        Self {
            keyboard_ms: 120.0,
            history_ms: 300.0,
            reset_ms: 500.0,
            focus_ms: 900.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerConfig {
    pub scale_extent: ScaleExtent,
    /// Added on every side of the projected globe to form the translate extent.
    pub translate_padding: f64,
    pub keyboard_zoom_step: f64,
    /// Screen pixels moved per arrow key press.
    pub keyboard_pan_step: f64,
    pub wheel_delta_factor: f64,
    pub ctrl_wheel_boost: f64,
    pub focus_max_scale: f64,
    pub focus_fill: f64,
    pub durations: TransitionDurations,
    pub history: HistoryThresholds,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            scale_extent: ScaleExtent::default(),
            translate_padding: 100.0,
            keyboard_zoom_step: 1.2,
            keyboard_pan_step: 40.0,
            wheel_delta_factor: 0.002,
            ctrl_wheel_boost: 10.0,
            focus_max_scale: 10.0,
            focus_fill: 0.9,
            durations: TransitionDurations::default(),
            history: HistoryThresholds::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Timing {
    /// Apply now, animating over `duration_ms`.
    Immediate { duration_ms: f64 },
    /// Draw on the next animation frame; a newer update supersedes it.
    Coalesced,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewUpdate {
    pub transform: ViewTransform,
    pub timing: Timing,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct DragState {
    last: [f64; 2],
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    config: ControllerConfig,
    size: ViewportSize,
    translate_extent: Aabb2,
    transform: ViewTransform,
    history: ViewHistory,
    drag: Option<DragState>,
    wheel_last: Option<Time>,
    focused: bool,
}

impl InteractionController {
    /// `world_bounds` is the projected globe outline in untransformed
    /// screen space.
    pub fn new(config: ControllerConfig, size: ViewportSize, world_bounds: Aabb2) -> Self {
        Self {
            config,
            size,
            translate_extent: world_bounds.padded(config.translate_padding),
            transform: ViewTransform::IDENTITY,
            history: ViewHistory::new(config.history),
            drag: None,
            wheel_last: None,
            focused: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn translate_extent(&self) -> Aabb2 {
        self.translate_extent
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// A wheel gesture has started and not yet been committed.
    pub fn wheel_gesture_pending(&self) -> bool {
        self.wheel_last.is_some()
    }

    fn viewport(&self) -> Aabb2 {
        Aabb2::new([0.0, 0.0], [self.size.width, self.size.height])
    }

    fn constrained(&self, t: ViewTransform) -> ViewTransform {
        let t = ViewTransform::new(t.x, t.y, self.config.scale_extent.clamp(t.k));
        constrain(t, self.viewport(), self.translate_extent)
    }

    fn set(&mut self, t: ViewTransform, timing: Timing) -> Option<ViewUpdate> {
        let t = self.constrained(t);
        if !t.is_finite() {
            return None;
        }
        self.transform = t;
        Some(ViewUpdate {
            transform: t,
            timing,
        })
    }

    fn immediate(&self, duration_ms: f64) -> Timing {
        Timing::Immediate { duration_ms }
    }

    /// Records the current view in history (gesture end).
    pub fn commit(&mut self) -> bool {
        self.history.push(self.transform)
    }

    /// Re-derives the translate extent after a container resize and pulls
    /// the current view back inside it.
    pub fn resize(&mut self, size: ViewportSize, world_bounds: Aabb2) -> ViewTransform {
        self.size = size;
        self.translate_extent = world_bounds.padded(self.config.translate_padding);
        let t = self.constrained(self.transform);
        if t.is_finite() {
            self.transform = t;
        }
        tracing::debug!(
            width = size.width,
            height = size.height,
            k = self.transform.k,
            "view constrained after resize"
        );
        self.transform
    }

    pub fn handle(&mut self, event: &GestureEvent) -> Option<ViewUpdate> {
        if !accepts(event) {
            return None;
        }
        match event {
            GestureEvent::Wheel {
                position,
                delta_y,
                modifiers,
                time,
            } => {
                self.wheel_last = Some(*time);
                self.wheel_zoom(*position, *delta_y, *modifiers)
            }
            GestureEvent::PointerDown { position, .. } => {
                self.focused = true;
                self.drag = Some(DragState { last: *position });
                None
            }
            GestureEvent::PointerMove { position } => {
                let drag = self.drag.as_mut()?;
                let dx = position[0] - drag.last[0];
                let dy = position[1] - drag.last[1];
                drag.last = *position;
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                let t = self.transform;
                self.set(ViewTransform::new(t.x + dx, t.y + dy, t.k), Timing::Coalesced)
            }
            GestureEvent::PointerUp { .. } => {
                if self.drag.take().is_some() {
                    self.commit();
                }
                None
            }
            GestureEvent::Key { key, modifiers } => self.key(key, *modifiers),
            GestureEvent::Focus => {
                self.focused = true;
                None
            }
            GestureEvent::DoubleClick { .. } => None,
        }
    }

    /// Ends an idle wheel gesture, committing it to history. Call once per
    /// frame.
    pub fn tick(&mut self, now: Time) -> bool {
        match self.wheel_last {
            Some(last) if (now.0 - last.0) * 1000.0 >= WHEEL_IDLE_MS => self.end_wheel_gesture(),
            _ => false,
        }
    }

    /// A discrete action interrupts a wheel gesture still in progress; the
    /// view it reached is recorded first.
    fn end_wheel_gesture(&mut self) -> bool {
        if self.wheel_last.take().is_some() {
            self.commit();
            return true;
        }
        false
    }

    fn wheel_zoom(&mut self, at: [f64; 2], delta_y: f64, modifiers: Modifiers) -> Option<ViewUpdate> {
        let boost = if modifiers.ctrl { self.config.ctrl_wheel_boost } else { 1.0 };
        let factor = 2f64.powf(-delta_y * self.config.wheel_delta_factor * boost);
        let k = self.config.scale_extent.clamp(self.transform.k * factor);
        if k == self.transform.k {
            return None;
        }
        let t = self.transform.scale_to(k, at);
        self.set(t, Timing::Coalesced)
    }

    fn key(&mut self, key: &Key, modifiers: Modifiers) -> Option<ViewUpdate> {
        if !self.focused {
            return None;
        }
        self.end_wheel_gesture();
        let step = self.config.keyboard_pan_step / self.transform.k.max(f64::EPSILON);
        let zoom = self.config.keyboard_zoom_step;
        let timing = self.immediate(self.config.durations.keyboard_ms);
        let update = match key {
            Key::Char('+') | Key::Char('=') => self.zoom_by(zoom, timing),
            Key::Char('-') | Key::Char('_') => self.zoom_by(1.0 / zoom, timing),
            Key::ArrowUp => self.set(self.transform.translate_by(0.0, step), timing),
            Key::ArrowDown => self.set(self.transform.translate_by(0.0, -step), timing),
            Key::ArrowLeft => self.set(self.transform.translate_by(step, 0.0), timing),
            Key::ArrowRight => self.set(self.transform.translate_by(-step, 0.0), timing),
            Key::Char('r') | Key::Char('R') => return self.reset(),
            Key::Escape => {
                self.focused = false;
                return None;
            }
            Key::Backspace if modifiers.history_modifier() => return self.back(),
            Key::Char('f') | Key::Char('F') if modifiers.history_modifier() => {
                return self.forward();
            }
            _ => return None,
        };
        if update.is_some() {
            self.commit();
        }
        update
    }

    /// Zooms around the viewport centre.
    pub fn zoom_by(&mut self, factor: f64, timing: Timing) -> Option<ViewUpdate> {
        let k = self.config.scale_extent.clamp(self.transform.k * factor);
        let t = self.transform.scale_to(k, self.size.center());
        self.set(t, timing)
    }

    /// Back to the identity view.
    pub fn reset(&mut self) -> Option<ViewUpdate> {
        self.end_wheel_gesture();
        let update = self.set(
            ViewTransform::IDENTITY,
            self.immediate(self.config.durations.reset_ms),
        );
        self.commit();
        update
    }

    /// Fits `bounds` (untransformed screen space) into the viewport.
    pub fn focus_on(&mut self, bounds: Aabb2) -> Option<ViewUpdate> {
        let w = self.size.width;
        let h = self.size.height;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        self.end_wheel_gesture();
        let fit = bounds.width().max(0.0) / w;
        let fit = fit.max(bounds.height().max(0.0) / h);
        let scale = if fit > 0.0 {
            (self.config.focus_fill / fit).min(self.config.focus_max_scale)
        } else {
            self.config.focus_max_scale
        };
        let [cx, cy] = bounds.center();
        let target = ViewTransform::new(w / 2.0 - scale * cx, h / 2.0 - scale * cy, scale);
        let update = self.set(target, self.immediate(self.config.durations.focus_ms));
        self.commit();
        update
    }

    pub fn back(&mut self) -> Option<ViewUpdate> {
        self.end_wheel_gesture();
        let t = self.history.back()?;
        self.set(t, self.immediate(self.config.durations.history_ms))
    }

    pub fn forward(&mut self) -> Option<ViewUpdate> {
        self.end_wheel_gesture();
        let t = self.history.forward()?;
        self.set(t, self.immediate(self.config.durations.history_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::{ControllerConfig, InteractionController, Timing};
    use crate::gesture::{GestureEvent, Key, Modifiers, PointerButton};
    use crate::transform::ViewTransform;
    use foundation::{Aabb2, Time};
    use pretty_assertions::assert_eq;
    use scene::ViewportSize;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    // A world box filling the viewport so panning at k > 1 is possible.
    fn controller() -> InteractionController {
        let size = ViewportSize::new(960.0, 500.0);
        let world = Aabb2::new([100.0, 100.0], [860.0, 400.0]);
        let mut c = InteractionController::new(ControllerConfig::default(), size, world);
        c.commit();
        c
    }

    fn key(c: &mut InteractionController, name: &str, modifiers: Modifiers) -> Option<ViewTransform> {
        c.handle(&GestureEvent::Key {
            key: Key::from_name(name),
            modifiers,
        })
        .map(|u| u.transform)
    }

    fn wheel(delta_y: f64, modifiers: Modifiers, ms: f64) -> GestureEvent {
        GestureEvent::Wheel {
            position: [480.0, 250.0],
            delta_y,
            modifiers,
            time: Time::from_millis(ms),
        }
    }

    #[test]
    fn unmodified_wheel_passes_through() {
        let mut c = controller();
        assert_eq!(c.handle(&wheel(-500.0, Modifiers::NONE, 0.0)), None);
        assert_eq!(c.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn ctrl_wheel_zooms_about_pointer_and_coalesces() {
        let mut c = controller();
        let update = c.handle(&wheel(-50.0, Modifiers::ctrl(), 0.0)).expect("zoom");
        assert_eq!(update.timing, Timing::Coalesced);
        // 2^(50 * 0.002 * 10) = 2
        assert_close(update.transform.k, 2.0, 1e-9);
        let anchor = update.transform.invert([480.0, 250.0]);
        assert_close(anchor[0], 480.0, 1e-9);
        assert_close(anchor[1], 250.0, 1e-9);
    }

    #[test]
    fn meta_wheel_uses_unboosted_delta() {
        let mut c = controller();
        let update = c.handle(&wheel(-500.0, Modifiers::meta(), 0.0)).expect("zoom");
        assert_close(update.transform.k, 2.0, 1e-9);
    }

    #[test]
    fn wheel_zoom_commits_after_idle() {
        let mut c = controller();
        c.handle(&wheel(-50.0, Modifiers::ctrl(), 0.0));
        c.handle(&wheel(-10.0, Modifiers::ctrl(), 40.0));
        assert!(!c.tick(Time::from_millis(100.0)));
        assert_eq!(c.history().len(), 1);
        assert!(c.tick(Time::from_millis(200.0)));
        assert_eq!(c.history().len(), 2);
    }

    #[test]
    fn wheel_gesture_stays_pending_until_idle() {
        let mut c = controller();
        assert!(!c.wheel_gesture_pending());
        c.handle(&wheel(-50.0, Modifiers::ctrl(), 1000.0));
        assert!(c.wheel_gesture_pending());
        assert!(!c.tick(Time(1.1)));
        assert!(c.wheel_gesture_pending());
        assert!(c.tick(Time(1.2)));
        assert!(!c.wheel_gesture_pending());
    }

    #[test]
    fn reset_during_wheel_keeps_the_wheel_view() {
        let mut c = controller();
        let zoomed = c.handle(&wheel(-50.0, Modifiers::ctrl(), 0.0)).expect("zoom").transform;
        c.reset();
        assert_eq!(c.history().len(), 3);
        assert_eq!(c.back().map(|u| u.transform), Some(zoomed));
        assert!(!c.tick(Time::from_millis(1000.0)));
    }

    #[test]
    fn scale_is_bounded() {
        let mut c = controller();
        let update = c.handle(&wheel(-100_000.0, Modifiers::ctrl(), 0.0)).expect("zoom");
        assert_eq!(update.transform.k, 18.0);
        assert_eq!(c.handle(&wheel(-100.0, Modifiers::ctrl(), 10.0)), None);
        let update = c.handle(&wheel(100_000.0, Modifiers::ctrl(), 20.0)).expect("zoom");
        assert_eq!(update.transform.k, 1.0);
    }

    #[test]
    fn double_click_is_ignored() {
        let mut c = controller();
        assert_eq!(c.handle(&GestureEvent::DoubleClick { position: [10.0, 10.0] }), None);
        assert_eq!(c.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn drag_pans_and_commits_on_release() {
        let mut c = controller();
        c.zoom_by(4.0, Timing::Immediate { duration_ms: 0.0 });
        let before = c.transform();
        let history_before = c.history().len();

        c.handle(&GestureEvent::PointerDown {
            position: [500.0, 300.0],
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        });
        let update = c
            .handle(&GestureEvent::PointerMove { position: [520.0, 290.0] })
            .expect("pan");
        assert_eq!(update.timing, Timing::Coalesced);
        assert_close(update.transform.x, before.x + 20.0, 1e-9);
        assert_close(update.transform.y, before.y - 10.0, 1e-9);
        assert_eq!(c.history().len(), history_before);

        c.handle(&GestureEvent::PointerUp { position: [520.0, 290.0] });
        assert_eq!(c.history().len(), history_before + 1);
    }

    #[test]
    fn shift_or_secondary_drag_is_ignored() {
        let mut c = controller();
        c.zoom_by(4.0, Timing::Immediate { duration_ms: 0.0 });
        let before = c.transform();
        for (button, modifiers) in [
            (PointerButton::Primary, Modifiers::shift()),
            (PointerButton::Secondary, Modifiers::NONE),
        ] {
            c.handle(&GestureEvent::PointerDown {
                position: [500.0, 300.0],
                button,
                modifiers,
            });
            assert_eq!(c.handle(&GestureEvent::PointerMove { position: [560.0, 260.0] }), None);
            c.handle(&GestureEvent::PointerUp { position: [560.0, 260.0] });
        }
        assert_eq!(c.transform(), before);
    }

    #[test]
    fn keys_need_focus() {
        let mut c = controller();
        assert_eq!(key(&mut c, "+", Modifiers::NONE), None);
        c.handle(&GestureEvent::Focus);
        let t = key(&mut c, "+", Modifiers::NONE).expect("zoom in");
        assert_close(t.k, 1.2, 1e-12);
        key(&mut c, "Escape", Modifiers::NONE);
        assert!(!c.is_focused());
        assert_eq!(key(&mut c, "=", Modifiers::NONE), None);
    }

    #[test]
    fn keyboard_steps_are_immediate_and_recorded() {
        let mut c = controller();
        c.handle(&GestureEvent::Focus);
        let update = c
            .handle(&GestureEvent::Key {
                key: Key::Char('='),
                modifiers: Modifiers::NONE,
            })
            .expect("zoom");
        assert_eq!(update.timing, Timing::Immediate { duration_ms: 120.0 });
        key(&mut c, "=", Modifiers::NONE);
        let k = c.transform().k;
        assert_close(k, 1.44, 1e-12);

        // Arrow pans 40 screen pixels at any scale.
        let before = c.transform();
        let t = key(&mut c, "ArrowLeft", Modifiers::NONE).expect("pan");
        assert_close(t.x - before.x, 40.0, 1e-9);

        let t = key(&mut c, "-", Modifiers::NONE).expect("zoom out");
        assert_close(t.k, 1.2, 1e-9);
        assert_eq!(c.history().len(), 5);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut c = controller();
        c.zoom_by(3.0, Timing::Immediate { duration_ms: 0.0 });
        c.handle(&GestureEvent::Focus);
        let update = c
            .handle(&GestureEvent::Key {
                key: Key::Char('R'),
                modifiers: Modifiers::NONE,
            })
            .expect("reset");
        assert_eq!(update.transform, ViewTransform::IDENTITY);
        assert_eq!(update.timing, Timing::Immediate { duration_ms: 500.0 });
    }

    #[test]
    fn history_keys_need_alt_or_meta() {
        let mut c = controller();
        c.handle(&GestureEvent::Focus);
        key(&mut c, "+", Modifiers::NONE);
        let zoomed = c.transform();

        assert_eq!(key(&mut c, "Backspace", Modifiers::NONE), None);
        assert_eq!(key(&mut c, "Backspace", Modifiers::alt()), Some(ViewTransform::IDENTITY));
        assert_eq!(key(&mut c, "Backspace", Modifiers::meta()), None);
        assert_eq!(key(&mut c, "F", Modifiers::NONE), None);
        assert_eq!(key(&mut c, "F", Modifiers::meta()), Some(zoomed));
        assert_eq!(key(&mut c, "F", Modifiers::alt()), None);
    }

    #[test]
    fn focus_fits_bounds() {
        let mut c = controller();
        let bounds = Aabb2::new([400.0, 200.0], [496.0, 250.0]);
        let update = c.focus_on(bounds).expect("focus");
        // max(96/960, 50/500) = 0.1 → 0.9 / 0.1 = 9
        assert_close(update.transform.k, 9.0, 1e-9);
        assert_eq!(update.timing, Timing::Immediate { duration_ms: 900.0 });
        let centre = update.transform.apply(bounds.center());
        assert_close(centre[0], 480.0, 1e-6);
        assert_close(centre[1], 250.0, 1e-6);
    }

    #[test]
    fn focus_on_a_point_caps_scale() {
        let mut c = controller();
        let p = Aabb2::new([480.0, 250.0], [480.0, 250.0]);
        let update = c.focus_on(p).expect("focus");
        assert_close(update.transform.k, 10.0, 1e-12);
    }

    #[test]
    fn resize_reconstrains_view() {
        let mut c = controller();
        c.zoom_by(2.0, Timing::Immediate { duration_ms: 0.0 });
        let t = c.resize(
            ViewportSize::new(480.0, 250.0),
            Aabb2::new([50.0, 50.0], [430.0, 200.0]),
        );
        assert_eq!(c.translate_extent(), Aabb2::new([-50.0, -50.0], [530.0, 300.0]));
        assert!(t.is_finite());
    }
}
