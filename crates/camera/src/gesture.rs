//! Toolkit-neutral input events and the filter deciding which of them the
//! map consumes.

use foundation::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl or the platform command key.
    pub fn zoom_modifier(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Alt or the platform command key.
    pub fn history_modifier(&self) -> bool {
        self.alt || self.meta
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
    Other(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Maps a DOM-style key name (`"ArrowUp"`, `"+"`, `"r"`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Wheel {
        position: [f64; 2],
        delta_y: f64,
        modifiers: Modifiers,
        time: Time,
    },
    DoubleClick {
        position: [f64; 2],
    },
    PointerDown {
        position: [f64; 2],
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        position: [f64; 2],
    },
    PointerUp {
        position: [f64; 2],
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
    /// The map element gained keyboard focus.
    Focus,
}

/// Whether the zoom behaviour may start from `event`. Rejected wheel events
/// are left to the page so ordinary scrolling keeps working.
pub fn accepts(event: &GestureEvent) -> bool {
    match event {
        GestureEvent::Wheel { modifiers, .. } => modifiers.zoom_modifier(),
        GestureEvent::DoubleClick { .. } => false,
        GestureEvent::PointerDown {
            button, modifiers, ..
        } => *button == PointerButton::Primary && !modifiers.shift,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureEvent, Key, Modifiers, PointerButton, accepts};
    use foundation::Time;

    fn wheel(modifiers: Modifiers) -> GestureEvent {
        GestureEvent::Wheel {
            position: [0.0, 0.0],
            delta_y: 100.0,
            modifiers,
            time: Time(0.0),
        }
    }

    fn down(button: PointerButton, modifiers: Modifiers) -> GestureEvent {
        GestureEvent::PointerDown {
            position: [0.0, 0.0],
            button,
            modifiers,
        }
    }

    #[test]
    fn wheel_needs_ctrl_or_meta() {
        assert!(!accepts(&wheel(Modifiers::NONE)));
        assert!(!accepts(&wheel(Modifiers::shift())));
        assert!(accepts(&wheel(Modifiers::ctrl())));
        assert!(accepts(&wheel(Modifiers::meta())));
    }

    #[test]
    fn double_click_never_zooms() {
        assert!(!accepts(&GestureEvent::DoubleClick { position: [1.0, 1.0] }));
    }

    #[test]
    fn drag_needs_primary_button_without_shift() {
        assert!(accepts(&down(PointerButton::Primary, Modifiers::NONE)));
        assert!(accepts(&down(PointerButton::Primary, Modifiers::ctrl())));
        assert!(!accepts(&down(PointerButton::Primary, Modifiers::shift())));
        assert!(!accepts(&down(PointerButton::Secondary, Modifiers::NONE)));
        assert!(!accepts(&down(PointerButton::Middle, Modifiers::NONE)));
    }

    #[test]
    fn key_names_map_to_keys() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name("+"), Key::Char('+'));
        assert_eq!(Key::from_name("F"), Key::Char('F'));
        assert_eq!(Key::from_name("Enter"), Key::Other("Enter".into()));
    }
}
