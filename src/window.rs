//! Native window
//!
//! Opens a winit window, forwards its input to an `App` and presents the
//! dirty part of every frame through softbuffer at a fixed frame rate.

use crate::app::App;
use crate::canvas::Canvas;
use crate::dom::Document;
use crate::event::{Key, MouseButton};
use crate::fonts::FontProvider;
use crate::geometry::Rect;
use crate::input::{Outcome, RawInput};
use log::{debug, error, info};
use softbuffer::{Context, SoftBufferError, Surface};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use winit::{
    dpi::PhysicalSize,
    error::OsError,
    event::{ElementState, Event as WinitEvent, MouseScrollDelta, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

pub const FRAME_RATE: u32 = 60;
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub borderless: bool,
    pub maximized: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            resizable: false,
            borderless: false,
            maximized: false,
        }
    }
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the inner size. Zero keeps the current value.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        if width > 0 {
            self.width = width;
        }
        if height > 0 {
            self.height = height;
        }
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn borderless(mut self, borderless: bool) -> Self {
        self.borderless = borderless;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }
}

#[derive(Debug)]
pub enum WindowError {
    Os(OsError),
    /// softbuffer errors carry raw window handles, so only the message is kept
    Surface(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::Os(e) => write!(f, "Failed to create window: {}", e),
            WindowError::Surface(e) => write!(f, "Surface error: {}", e),
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WindowError::Os(e) => Some(e),
            WindowError::Surface(_) => None,
        }
    }
}

impl From<OsError> for WindowError {
    fn from(e: OsError) -> Self {
        WindowError::Os(e)
    }
}

impl From<SoftBufferError> for WindowError {
    fn from(e: SoftBufferError) -> Self {
        WindowError::Surface(e.to_string())
    }
}

/// Where finished frames go.
pub trait Presenter {
    /// Current size of the area frames are shown in.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Shows `canvas`, of which only `region` is known to have changed.
    fn present(&mut self, canvas: &Canvas, region: Rect) -> Result<(), WindowError>;
}

/// Presents into a winit window through softbuffer. Owns the window so
/// the surface never outlives it.
pub struct SoftbufferPresenter {
    surface: Surface,
    _context: Context,
    window: winit::window::Window,
    size: (u32, u32),
}

impl SoftbufferPresenter {
    pub fn new(window: winit::window::Window) -> Result<Self, WindowError> {
        let context = unsafe { Context::new(&window) }?;
        let surface = unsafe { Surface::new(&context, &window) }?;
        Ok(Self {
            surface,
            _context: context,
            window,
            size: (0, 0),
        })
    }
}

impl Presenter for SoftbufferPresenter {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn present(&mut self, canvas: &Canvas, region: Rect) -> Result<(), WindowError> {
        let (Some(width), Some(height)) = (NonZeroU32::new(canvas.width as u32), NonZeroU32::new(canvas.height as u32))
        else {
            return Ok(());
        };
        if self.size != (width.get(), height.get()) {
            self.surface.resize(width, height)?;
            self.size = (width.get(), height.get());
        }
        let Some(region) = region.intersect(&canvas.bounds()) else {
            return Ok(());
        };

        let mut buffer = self.surface.buffer_mut()?;
        buffer.copy_from_slice(&canvas.pixels);
        let damage = softbuffer::Rect {
            x: region.x as u32,
            y: region.y as u32,
            width: NonZeroU32::new(region.width).unwrap_or(width),
            height: NonZeroU32::new(region.height).unwrap_or(height),
        };
        buffer.present_with_damage(&[damage])?;
        Ok(())
    }
}

pub struct Window {
    doc: Document,
    options: WindowOptions,
}

impl Window {
    pub fn new(doc: Document, options: WindowOptions) -> Self {
        Self { doc, options }
    }

    /// Opens the window and runs the loop until it is closed. Only returns
    /// when setting up the window fails.
    pub fn show(self) -> Result<(), WindowError> {
        let o = &self.options;
        let event_loop = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title(o.title.clone())
            .with_inner_size(PhysicalSize::new(o.width, o.height))
            .with_resizable(o.resizable)
            .with_decorations(!o.borderless)
            .with_maximized(o.maximized)
            .build(&event_loop)?;
        let mut presenter = SoftbufferPresenter::new(window)?;
        let (width, height) = presenter.framebuffer_size();

        info!("window {}x{} '{}'", width, height, o.title);
        let mut app = App::new(self.doc, width, height);

        let frame_time = Duration::from_secs(1) / FRAME_RATE;
        let mut next_tick = Instant::now();

        event_loop.run(move |event, _, control_flow| match event {
            WinitEvent::WindowEvent { event, .. } => {
                if let Some(raw) = translate(&event) {
                    app.dispatch(raw);
                }
            }
            WinitEvent::RedrawRequested(_) => {
                let canvas = app.canvas();
                if let Err(e) = presenter.present(canvas, canvas.bounds()) {
                    error!("{}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            WinitEvent::MainEventsCleared => {
                let now = Instant::now();
                if now >= next_tick {
                    next_tick = now + frame_time;
                    sync_size(&presenter, &mut app);
                    let frame = app.tick();
                    if frame.outcome == Outcome::Close {
                        info!("window closed");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    if let Some(region) = frame.dirty {
                        if let Err(e) = presenter.present(app.canvas(), region) {
                            error!("{}", e);
                            *control_flow = ControlFlow::Exit;
                            return;
                        }
                    }
                }
                *control_flow = ControlFlow::WaitUntil(next_tick);
            }
            _ => {}
        })
    }
}

/// Posts a resize when the framebuffer no longer matches the canvas and no
/// resize is already on its way.
pub fn sync_size<P: Presenter, F: FontProvider>(presenter: &P, app: &mut App<F>) {
    let (width, height) = presenter.framebuffer_size();
    let canvas = app.canvas();
    if (canvas.width, canvas.height) == (width as usize, height as usize) || app.has_resize() {
        return;
    }
    debug!("framebuffer is {}x{}, resizing canvas", width, height);
    app.dispatch(RawInput::Resized { width, height });
}

/// Converts a winit window event into platform-neutral input.
pub fn translate(event: &WindowEvent<'_>) -> Option<RawInput> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(RawInput::CursorMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => Some(RawInput::Button {
            button: map_button(*button),
            pressed: *state == ElementState::Pressed,
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
            };
            Some(RawInput::Wheel { dx, dy })
        }
        WindowEvent::ReceivedCharacter(ch) => Some(RawInput::Character(*ch)),
        WindowEvent::KeyboardInput { input, .. } => Some(RawInput::Key {
            key: input.virtual_keycode.and_then(map_key),
            pressed: input.state == ElementState::Pressed,
        }),
        WindowEvent::Resized(size) => Some(RawInput::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CloseRequested => Some(RawInput::CloseRequested),
        WindowEvent::Focused(false) => Some(RawInput::FocusLost),
        _ => None,
    }
}

pub fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Other(_) => None,
    }
}

pub fn map_key(key: VirtualKeyCode) -> Option<Key> {
    Some(match key {
        VirtualKeyCode::Left => Key::Left,
        VirtualKeyCode::Right => Key::Right,
        VirtualKeyCode::Up => Key::Up,
        VirtualKeyCode::Down => Key::Down,
        VirtualKeyCode::Escape => Key::Escape,
        VirtualKeyCode::Space => Key::Space,
        VirtualKeyCode::Back => Key::Backspace,
        VirtualKeyCode::Delete => Key::Delete,
        VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => Key::Enter,
        VirtualKeyCode::Tab => Key::Tab,
        VirtualKeyCode::Home => Key::Home,
        VirtualKeyCode::End => Key::End,
        VirtualKeyCode::PageUp => Key::PageUp,
        VirtualKeyCode::PageDown => Key::PageDown,
        VirtualKeyCode::LShift | VirtualKeyCode::RShift => Key::Shift,
        VirtualKeyCode::LControl | VirtualKeyCode::RControl => Key::Ctrl,
        VirtualKeyCode::LAlt | VirtualKeyCode::RAlt => Key::Alt,
        _ => return None,
    })
}
