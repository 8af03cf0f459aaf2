//! Typed input events
//!
//! Events are plain immutable values produced on the platform side and
//! consumed by the loop. Their `Display` form is a slash separated path
//! used in logs, e.g. `mouse/down/1.5/2.5/left`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        })
    }
}

/// Non-character keys the toolkit reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Backspace,
    Delete,
    Enter,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Ctrl,
    Alt,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Key::Left => "left",
            Key::Right => "right",
            Key::Up => "up",
            Key::Down => "down",
            Key::Escape => "escape",
            Key::Space => "space",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Enter => "enter",
            Key::Tab => "tab",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Shift => "shift",
            Key::Ctrl => "ctrl",
            Key::Alt => "alt",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    WindowClose,
    MouseMove { x: f32, y: f32 },
    MouseDown { x: f32, y: f32, button: MouseButton },
    MouseUp { x: f32, y: f32, button: MouseButton },
    /// Wheel offsets, not a pointer position
    MouseScroll { x: f32, y: f32 },
    KbType { ch: char },
    KbDown { key: Key },
    KbUp { key: Key },
    KbRepeat { key: Key },
    Resize { x: i32, y: i32, width: u32, height: u32 },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::WindowClose => write!(f, "window/close"),
            Event::MouseMove { x, y } => write!(f, "mouse/move/{}/{}", x, y),
            Event::MouseDown { x, y, button } => write!(f, "mouse/down/{}/{}/{}", x, y, button),
            Event::MouseUp { x, y, button } => write!(f, "mouse/up/{}/{}/{}", x, y, button),
            Event::MouseScroll { x, y } => write!(f, "mouse/scroll/{}/{}", x, y),
            Event::KbType { ch } => write!(f, "keyboard/type/{}", ch),
            Event::KbDown { key } => write!(f, "keyboard/down/{}", key),
            Event::KbUp { key } => write!(f, "keyboard/up/{}", key),
            Event::KbRepeat { key } => write!(f, "keyboard/repeat/{}", key),
            Event::Resize { width, height, .. } => write!(f, "viewport/resize/{}/{}", width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_strings() {
        let down = Event::MouseDown { x: 1.5, y: 2.5, button: MouseButton::Left };
        assert_eq!(down.to_string(), "mouse/down/1.5/2.5/left");
        assert_eq!(Event::MouseMove { x: 2.0, y: 0.25 }.to_string(), "mouse/move/2/0.25");
        assert_eq!(
            Event::MouseUp { x: 3.0, y: 4.0, button: MouseButton::Middle }.to_string(),
            "mouse/up/3/4/middle"
        );
        assert_eq!(Event::KbType { ch: 'q' }.to_string(), "keyboard/type/q");
        assert_eq!(Event::KbUp { key: Key::Backspace }.to_string(), "keyboard/up/backspace");
        assert_eq!(Event::KbRepeat { key: Key::PageDown }.to_string(), "keyboard/repeat/pagedown");
        assert_eq!(
            Event::Resize { x: 0, y: 0, width: 800, height: 600 }.to_string(),
            "viewport/resize/800/600"
        );
        assert_eq!(Event::WindowClose.to_string(), "window/close");
    }

    #[test]
    fn keyboard_strings_use_the_char_and_keyboard_prefix() {
        assert_eq!(Event::KbType { ch: 'é' }.to_string(), "keyboard/type/é");
        assert_eq!(Event::KbType { ch: '7' }.to_string(), "keyboard/type/7");
        assert_eq!(Event::KbDown { key: Key::Enter }.to_string(), "keyboard/down/enter");
        assert_eq!(
            Event::MouseScroll { x: 0.0, y: -1.5 }.to_string(),
            "mouse/scroll/0/-1.5"
        );
    }
}
