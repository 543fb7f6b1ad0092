//! Normalized input events and the keyboard command table.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in device coordinates, as consumed by the tool controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
}

impl PointerEvent {
    /// Left-button press with no modifiers.
    pub fn down(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(position: Point) -> Self {
        PointerEvent::Move {
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Left-button release.
    pub fn up(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => *position,
        }
    }
}

/// Touch lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One finger changing state, in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Stable identifier for the finger across its lifetime.
    pub id: u64,
    pub phase: TouchPhase,
    pub position: Point,
    /// Host timestamp (monotonic, arbitrary origin).
    pub time: Duration,
}

impl TouchEvent {
    pub fn new(id: u64, phase: TouchPhase, position: Point, time: Duration) -> Self {
        Self {
            id,
            phase,
            position,
            time,
        }
    }
}

/// Raw input accepted by the gesture normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Mouse pointer (passed through unchanged).
    Pointer(PointerEvent),
    /// Mouse wheel; positive `delta.y` scrolls down (zooms out).
    Wheel { position: Point, delta: Vec2 },
    Touch(TouchEvent),
}

/// Core-level keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCommand {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Delete,
    /// Abandon the active gesture, or clear the selection.
    Escape,
}

impl KeyCommand {
    /// Map a key name plus modifiers to a command.
    pub fn from_key(key: &str, modifiers: Modifiers) -> Option<KeyCommand> {
        ShortcutRegistry::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, modifiers))
            .map(|shortcut| shortcut.command)
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: KeyCommand,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: KeyCommand,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Key names compare case-insensitively; modifiers must match exactly.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == modifiers.command()
            && self.shift == modifiers.shift
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, KeyCommand::Undo, "Undo"),
            Shortcut::new("Z", true, true, KeyCommand::Redo, "Redo"),
            Shortcut::new("Y", true, false, KeyCommand::Redo, "Redo"),
            Shortcut::new("C", true, false, KeyCommand::Copy, "Copy selection"),
            Shortcut::new("X", true, false, KeyCommand::Cut, "Cut selection"),
            Shortcut::new("V", true, false, KeyCommand::Paste, "Paste"),
            Shortcut::new("A", true, false, KeyCommand::SelectAll, "Select all objects"),
            Shortcut::new("Delete", false, false, KeyCommand::Delete, "Delete selection"),
            Shortcut::new("Backspace", false, false, KeyCommand::Delete, "Delete selection"),
            Shortcut::new("Escape", false, false, KeyCommand::Escape, "Cancel current action"),
        ]
    }

    /// Help text listing every shortcut, one per line.
    pub fn describe() -> String {
        Self::all()
            .iter()
            .map(|shortcut| format!("{:20} {}", shortcut.format(), shortcut.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
