//! Sprig - a minimal declarative GUI toolkit
//!
//! An XML document describes a window's widgets. The document is parsed into
//! an arena tree, laid out once as nodes are attached, painted onto a
//! software canvas and shown in a native window. Input is turned into typed
//! events on the platform side and applied to the tree by a single consumer.

pub mod app;
pub mod canvas;
pub mod config;
pub mod dom;
pub mod event;
pub mod fonts;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod parser;
pub mod queue;
pub mod renderer;
pub mod sandbox;
pub mod style;
pub mod window;

pub use app::{App, Frame};
pub use dom::{Document, Node, NodeId, NodeKind};
pub use event::{Event, Key, MouseButton};
pub use parser::{load, parse, LoadError, ParseError};
pub use window::{Window, WindowOptions};
