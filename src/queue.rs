//! Event hand-off between platform callbacks and the loop
//!
//! Two channels: a bounded event queue that drops its oldest entry when
//! full, and a single-slot resize signal that only keeps the latest size.
//! Neither side ever blocks.

use crate::event::Event;
use crate::input::{EventRouter, RawInput};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const QUEUE_CAPACITY: usize = 16;

/// Bounded FIFO that makes room by discarding the oldest entry.
pub struct DropOldest<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> DropOldest<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Pushes `item`, returning how many older entries had to go.
    pub fn push(&self, mut item: T) -> usize {
        let mut dropped = 0;
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return dropped,
                Err(TrySendError::Full(back)) => {
                    if self.rx.try_recv().is_ok() {
                        dropped += 1;
                    }
                    item = back;
                }
                // both ends live in self
                Err(TrySendError::Disconnected(_)) => return dropped,
            }
        }
    }

    pub fn pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

pub struct EventQueue {
    inner: DropOldest<Event>,
    dropped: AtomicUsize,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAPACITY)
    }
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: DropOldest::new(capacity),
            dropped: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, event: Event) {
        let dropped = self.inner.push(event);
        if dropped > 0 {
            let total = self.dropped.fetch_add(dropped, Ordering::Relaxed) + dropped;
            warn!("event queue full, dropped oldest event ({} dropped so far)", total);
        }
    }

    pub fn pop(&self) -> Option<Event> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Latest requested canvas size.
pub struct ResizeSignal {
    slot: DropOldest<(u32, u32)>,
}

impl Default for ResizeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeSignal {
    pub fn new() -> Self {
        Self { slot: DropOldest::new(1) }
    }

    pub fn post(&self, width: u32, height: u32) {
        self.slot.push((width, height));
    }

    pub fn take(&self) -> Option<(u32, u32)> {
        self.slot.pop()
    }

    pub fn is_pending(&self) -> bool {
        !self.slot.is_empty()
    }
}

/// One unit of loop work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Work {
    Resize(u32, u32),
    Event(Event),
}

/// Producer and consumer ends of both channels, plus the router that feeds
/// them.
#[derive(Default)]
pub struct Dispatcher {
    router: EventRouter,
    events: EventQueue,
    resize: ResizeSignal,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: routes raw input and posts the result.
    pub fn dispatch(&mut self, raw: RawInput) {
        let Some(event) = self.router.route(raw) else {
            return;
        };
        if let Event::Resize { width, height, .. } = event {
            self.resize.post(width, height);
        }
        self.events.push(event);
    }

    /// Consumer side: a pending resize first, otherwise the oldest event.
    pub fn next_work(&self) -> Option<Work> {
        if let Some((w, h)) = self.resize.take() {
            return Some(Work::Resize(w, h));
        }
        self.events.pop().map(Work::Event)
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn has_resize(&self) -> bool {
        self.resize.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(i: usize) -> Event {
        Event::MouseMove { x: i as f32, y: 0.0 }
    }

    #[test]
    fn overflow_drops_oldest() {
        let queue = EventQueue::new(QUEUE_CAPACITY);
        for i in 0..20 {
            queue.push(moved(i));
            assert!(queue.len() <= QUEUE_CAPACITY);
        }
        assert_eq!(queue.dropped(), 4);
        assert_eq!(queue.pop(), Some(moved(4)));
        let mut last = None;
        while let Some(e) = queue.pop() {
            last = Some(e);
        }
        assert_eq!(last, Some(moved(19)));
        assert!(queue.is_empty());
    }

    #[test]
    fn resize_keeps_latest() {
        let signal = ResizeSignal::new();
        signal.post(100, 100);
        signal.post(300, 200);
        assert_eq!(signal.take(), Some((300, 200)));
        assert_eq!(signal.take(), None);
    }

    #[test]
    fn resize_is_served_before_events() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(RawInput::CursorMoved { x: 1.0, y: 2.0 });
        dispatcher.dispatch(RawInput::Resized { width: 320, height: 240 });

        assert_eq!(dispatcher.next_work(), Some(Work::Resize(320, 240)));
        assert_eq!(dispatcher.next_work(), Some(Work::Event(Event::MouseMove { x: 1.0, y: 2.0 })));
        assert_eq!(
            dispatcher.next_work(),
            Some(Work::Event(Event::Resize { x: 0, y: 0, width: 320, height: 240 }))
        );
        assert_eq!(dispatcher.next_work(), None);
    }

    #[test]
    fn unmapped_input_is_not_queued() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(RawInput::Key { key: None, pressed: true });
        assert!(dispatcher.events().is_empty());
    }
}
