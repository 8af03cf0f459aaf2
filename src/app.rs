//! Loop state shared by the window and headless rendering
//!
//! `App` owns the document, the canvas and everything that mutates them.
//! Platform code feeds it raw input through `dispatch` and calls `tick` once
//! per frame.

use crate::canvas::Canvas;
use crate::dom::Document;
use crate::fonts::{FontCache, FontProvider};
use crate::geometry::Rect;
use crate::input::{InputState, Outcome, RawInput};
use crate::queue::{Dispatcher, Work};
use crate::renderer::Renderer;
use log::{debug, trace};

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Region to present, `None` when nothing changed
    pub dirty: Option<Rect>,
    pub outcome: Outcome,
}

pub struct App<F: FontProvider = FontCache> {
    doc: Document,
    input: InputState,
    dispatcher: Dispatcher,
    renderer: Renderer<F>,
    canvas: Canvas,
}

impl App {
    pub fn new(doc: Document, width: u32, height: u32) -> Self {
        Self::with_renderer(doc, Renderer::new(), width, height)
    }
}

impl<F: FontProvider> App<F> {
    pub fn with_renderer(doc: Document, renderer: Renderer<F>, width: u32, height: u32) -> Self {
        Self {
            doc,
            input: InputState::new(),
            dispatcher: Dispatcher::new(),
            renderer,
            canvas: Canvas::new(width as usize, height as usize),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Producer side, safe to call from any platform callback.
    pub fn dispatch(&mut self, raw: RawInput) {
        trace!("raw input {:?}", raw);
        self.dispatcher.dispatch(raw);
    }

    /// Takes a pending resize, or failing that at most one event, then
    /// renders.
    pub fn tick(&mut self) -> Frame {
        let mut outcome = Outcome::Continue;
        match self.dispatcher.next_work() {
            Some(Work::Resize(width, height)) => {
                self.canvas.resize(width as usize, height as usize);
            }
            Some(Work::Event(event)) => {
                debug!("{}", event);
                outcome = self.input.apply(&mut self.doc, &event);
            }
            None => {}
        }
        let dirty = self.renderer.render(&mut self.canvas, &self.doc, &self.input);
        Frame { dirty, outcome }
    }

    /// Ticks until both channels are empty or the document asks to close.
    pub fn drain(&mut self) -> Frame {
        let mut frame = self.tick();
        let mut dirty = frame.dirty;
        while frame.outcome == Outcome::Continue && self.has_pending() {
            frame = self.tick();
            dirty = match (dirty, frame.dirty) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            };
        }
        Frame { dirty, outcome: frame.outcome }
    }

    /// Whether `tick` still has work queued.
    pub fn has_pending(&self) -> bool {
        !self.dispatcher.events().is_empty() || self.dispatcher.has_resize()
    }

    pub fn has_resize(&self) -> bool {
        self.dispatcher.has_resize()
    }
}
