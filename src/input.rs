//! Input routing and editing state
//!
//! `EventRouter` runs where platform input arrives and only turns it into
//! `Event` values. `InputState` runs on the loop thread and is the only
//! place that mutates the document in response to input.

use crate::dom::{Document, NodeId};
use crate::event::{Event, Key, MouseButton};
use log::debug;
use std::collections::HashSet;

/// Platform input, already stripped of windowing-library types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    CursorMoved { x: f32, y: f32 },
    Button { button: Option<MouseButton>, pressed: bool },
    Wheel { dx: f32, dy: f32 },
    Character(char),
    Key { key: Option<Key>, pressed: bool },
    Resized { width: u32, height: u32 },
    /// The window stopped receiving keyboard input
    FocusLost,
    CloseRequested,
}

/// Converts raw input into typed events.
#[derive(Debug, Default)]
pub struct EventRouter {
    pointer: (f32, f32),
    held: HashSet<Key>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Returns `None` for input the toolkit doesn't react to.
    pub fn route(&mut self, raw: RawInput) -> Option<Event> {
        match raw {
            RawInput::CursorMoved { x, y } => {
                self.pointer = (x, y);
                Some(Event::MouseMove { x, y })
            }
            RawInput::Button { button, pressed } => {
                let button = button?;
                let (x, y) = self.pointer;
                if pressed {
                    Some(Event::MouseDown { x, y, button })
                } else {
                    Some(Event::MouseUp { x, y, button })
                }
            }
            RawInput::Wheel { dx, dy } => Some(Event::MouseScroll { x: dx, y: dy }),
            // control characters arrive as key events
            RawInput::Character(ch) if ch.is_control() => None,
            RawInput::Character(ch) => Some(Event::KbType { ch }),
            RawInput::Key { key, pressed } => {
                let key = key?;
                if !pressed {
                    self.held.remove(&key);
                    Some(Event::KbUp { key })
                } else if self.held.insert(key) {
                    Some(Event::KbDown { key })
                } else {
                    Some(Event::KbRepeat { key })
                }
            }
            RawInput::Resized { width, height } => Some(Event::Resize { x: 0, y: 0, width, height }),
            // releases that happen while unfocused are never seen
            RawInput::FocusLost => {
                self.held.clear();
                None
            }
            RawInput::CloseRequested => Some(Event::WindowClose),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Close,
}

/// Pointer position and keyboard focus as seen by the loop.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub pointer: (f32, f32),
    pub active: Option<NodeId>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, doc: &mut Document, event: &Event) -> Outcome {
        match *event {
            Event::MouseMove { x, y } => self.pointer = (x, y),
            Event::MouseUp { x, y, .. } => {
                self.active = doc.window().and_then(|win| doc.hit_test(win, x, y));
                debug!("active node: {:?}", self.active);
            }
            Event::KbType { ch } => {
                if let Some(id) = self.active {
                    doc.node_mut(id).value.push(ch);
                }
            }
            Event::KbUp { key: Key::Backspace } => {
                if let Some(id) = self.active {
                    doc.node_mut(id).value.pop();
                }
            }
            Event::WindowClose => return Outcome::Close,
            _ => {}
        }
        Outcome::Continue
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.active == Some(id)
    }

    pub fn pointer_inside(&self, doc: &Document, id: NodeId) -> bool {
        doc.node(id).frame.contains(self.pointer.0, self.pointer.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const DOC: &str = r#"<window width="200" height="200">
        <input id="field" value="ab"/>
        <label id="other" height="20"/>
    </window>"#;

    #[test]
    fn buttons_use_cached_pointer() {
        let mut router = EventRouter::new();
        router.route(RawInput::CursorMoved { x: 1.5, y: 2.5 });
        let ev = router.route(RawInput::Button { button: Some(MouseButton::Left), pressed: true });
        assert_eq!(ev.map(|e| e.to_string()).as_deref(), Some("mouse/down/1.5/2.5/left"));
        assert_eq!(router.route(RawInput::Button { button: None, pressed: true }), None);
    }

    #[test]
    fn held_key_repeats() {
        let mut router = EventRouter::new();
        let press = RawInput::Key { key: Some(Key::Left), pressed: true };
        assert_eq!(router.route(press), Some(Event::KbDown { key: Key::Left }));
        assert_eq!(router.route(press), Some(Event::KbRepeat { key: Key::Left }));
        assert_eq!(
            router.route(RawInput::Key { key: Some(Key::Left), pressed: false }),
            Some(Event::KbUp { key: Key::Left })
        );
        assert_eq!(router.route(press), Some(Event::KbDown { key: Key::Left }));
        assert_eq!(router.route(RawInput::Key { key: None, pressed: true }), None);
    }

    #[test]
    fn losing_focus_forgets_held_keys() {
        let mut router = EventRouter::new();
        let press = RawInput::Key { key: Some(Key::Shift), pressed: true };
        assert_eq!(router.route(press), Some(Event::KbDown { key: Key::Shift }));
        assert_eq!(router.route(RawInput::FocusLost), None);
        assert_eq!(router.route(press), Some(Event::KbDown { key: Key::Shift }));
    }

    #[test]
    fn control_characters_are_not_typed() {
        let mut router = EventRouter::new();
        assert_eq!(router.route(RawInput::Character('\u{8}')), None);
        assert_eq!(router.route(RawInput::Character('z')), Some(Event::KbType { ch: 'z' }));
    }

    #[test]
    fn focus_moves_on_release() {
        let mut doc = parse(DOC).expect("parse");
        let field = doc.find_by_id("field").expect("field");
        let mut state = InputState::new();

        state.apply(&mut doc, &Event::MouseDown { x: 20.0, y: 20.0, button: MouseButton::Left });
        assert_eq!(state.active, None);
        state.apply(&mut doc, &Event::MouseUp { x: 20.0, y: 20.0, button: MouseButton::Left });
        assert_eq!(state.active, Some(field));

        state.apply(&mut doc, &Event::MouseUp { x: 190.0, y: 195.0, button: MouseButton::Left });
        assert_eq!(state.active, None);
    }

    #[test]
    fn typing_and_backspace_edit_active_value() {
        let mut doc = parse(DOC).expect("parse");
        let field = doc.find_by_id("field").expect("field");
        let mut state = InputState::new();

        // nothing happens without focus
        state.apply(&mut doc, &Event::KbType { ch: 'x' });
        assert_eq!(doc.node(field).value_string(), "ab");

        state.active = Some(field);
        let backspace = Event::KbUp { key: Key::Backspace };
        state.apply(&mut doc, &backspace);
        assert_eq!(doc.node(field).value_string(), "a");
        state.apply(&mut doc, &backspace);
        assert_eq!(doc.node(field).value_string(), "");
        state.apply(&mut doc, &backspace);
        assert_eq!(doc.node(field).value_string(), "");

        state.apply(&mut doc, &Event::KbType { ch: 'h' });
        state.apply(&mut doc, &Event::KbType { ch: 'é' });
        assert_eq!(doc.node(field).value_string(), "hé");
    }

    #[test]
    fn close_stops() {
        let mut doc = parse(DOC).expect("parse");
        let mut state = InputState::new();
        assert_eq!(state.apply(&mut doc, &Event::WindowClose), Outcome::Close);
        assert_eq!(state.apply(&mut doc, &Event::MouseMove { x: 1.0, y: 1.0 }), Outcome::Continue);
        assert_eq!(state.pointer, (1.0, 1.0));
    }
}
