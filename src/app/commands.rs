//! Inbound input events.
//!
//! The transport turns keystrokes and window changes into [`InputEvent`]s;
//! the state machine decides what each one means in the active mode.
//! Letters stay as [`InputEvent::Char`] so the rename buffer can accept
//! them, and menus map `h`/`j`/`k`/`l`/`q` themselves.

/// Input from the connected terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Escape,
    Backspace,
    /// A printable character.
    Char(char),
    Resize { width: u16, height: u16 },
    /// Enter or leave the debug menu (ctrl+d).
    ToggleDebug,
    /// Quit from anywhere (ctrl+c).
    Interrupt,
    /// Debug shortcut that kills the pet (ctrl+k).
    ForceGameOver,
}

impl InputEvent {
    /// Parse a key name as produced by terminal key decoders
    /// (`"up"`, `"enter"`, `"ctrl+d"`, `"a"`, ...). Unknown keys yield
    /// `None` and are ignored by the session.
    pub fn from_key(key: &str) -> Option<Self> {
        let event = match key {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "enter" | "return" => Self::Confirm,
            "space" => Self::Char(' '),
            "esc" | "escape" => Self::Escape,
            "backspace" => Self::Backspace,
            "ctrl+d" => Self::ToggleDebug,
            "ctrl+c" => Self::Interrupt,
            "ctrl+k" => Self::ForceGameOver,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(event)
    }

    /// `Confirm`, or a space bar press.
    pub fn is_confirm(self) -> bool {
        matches!(self, Self::Confirm | Self::Char(' '))
    }

    /// Upward/backward movement, including vim keys.
    pub fn is_prev(self) -> bool {
        matches!(self, Self::Up | Self::Left | Self::Char('k' | 'h'))
    }

    /// Downward/forward movement, including vim keys.
    pub fn is_next(self) -> bool {
        matches!(self, Self::Down | Self::Right | Self::Char('j' | 'l'))
    }
}
