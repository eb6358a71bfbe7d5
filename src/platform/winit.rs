use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Fullscreen, Window, WindowBuilder, WindowId};

use crate::platform::{PlatformWindow, WindowCreationInfo, WindowProvider, WindowState};

/// One event loop serves every window of a provider; pumping any window
/// drains the shared queue and routes signals to the right recipient.
struct EventPump {
    event_loop: RefCell<EventLoop<()>>,
    signals: RefCell<HashMap<WindowId, Rc<WindowSignals>>>,
}

#[derive(Default)]
struct WindowSignals {
    close_requested: Cell<bool>,
}

impl EventPump {
    fn pump(&self) {
        let mut event_loop = self.event_loop.borrow_mut();
        let signals = &self.signals;

        let _ = event_loop.pump_events(Some(Duration::ZERO), |event, _target| {
            if let Event::WindowEvent { window_id, event } = event {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        tracing::debug!(target: "platform", window = ?window_id, "close requested");
                        if let Some(window) = signals.borrow().get(&window_id) {
                            window.close_requested.set(true);
                        }
                    }
                    _ => {}
                }
            }
        });
    }
}

/// Creates winit windows that all share one pumped event loop.
pub struct WinitWindowProvider {
    pump: Rc<EventPump>,
}

impl WinitWindowProvider {
    /// Fails if the process cannot get an event loop (headless session, or a
    /// second provider in the same process).
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        Ok(Self {
            pump: Rc::new(EventPump {
                event_loop: RefCell::new(event_loop),
                signals: RefCell::new(HashMap::new()),
            }),
        })
    }
}

impl WindowProvider for WinitWindowProvider {
    fn create_window(&self, info: &WindowCreationInfo) -> Result<Box<dyn PlatformWindow>> {
        let mut builder = WindowBuilder::new()
            .with_title(info.title.clone())
            .with_inner_size(PhysicalSize::new(info.width.max(1), info.height.max(1)))
            .with_position(PhysicalPosition::new(info.x, info.y))
            .with_visible(info.state != WindowState::Hidden);

        builder = match info.state {
            WindowState::Maximized => builder.with_maximized(true),
            WindowState::FullScreen | WindowState::BorderlessFullScreen => {
                builder.with_fullscreen(Some(Fullscreen::Borderless(None)))
            }
            _ => builder,
        };

        let event_loop = self.pump.event_loop.borrow();
        let window = Arc::new(
            builder
                .build(&event_loop)
                .context("failed to create window")?,
        );
        drop(event_loop);

        if info.state == WindowState::Minimized {
            window.set_minimized(true);
        }

        let signals = Rc::new(WindowSignals::default());
        self.pump
            .signals
            .borrow_mut()
            .insert(window.id(), signals.clone());

        tracing::info!(
            target: "platform",
            title = %info.title,
            width = info.width,
            height = info.height,
            "window created"
        );

        Ok(Box::new(WinitWindow {
            id: window.id(),
            window,
            signals,
            pump: self.pump.clone(),
            state: Cell::new(info.state),
        }))
    }
}

/// A native winit window plus its slice of the shared pump state.
pub struct WinitWindow {
    window: Arc<Window>,
    id: WindowId,
    signals: Rc<WindowSignals>,
    pump: Rc<EventPump>,
    state: Cell<WindowState>,
}

impl WinitWindow {
    /// The shared handle the graphics provider builds its surface from.
    pub fn native_handle(&self) -> Arc<Window> {
        self.window.clone()
    }
}

impl PlatformWindow for WinitWindow {
    fn position(&self) -> (i32, i32) {
        self.window
            .outer_position()
            .map(|position| (position.x, position.y))
            .unwrap_or((0, 0))
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let _ = self
            .window
            .request_inner_size(PhysicalSize::new(width.max(1), height.max(1)));
    }

    fn title(&self) -> String {
        self.window.title()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn state(&self) -> WindowState {
        if self.window.fullscreen().is_some() {
            // winit only does borderless here; trust the cache to tell the
            // two fullscreen flavors apart.
            return match self.state.get() {
                state @ (WindowState::FullScreen | WindowState::BorderlessFullScreen) => state,
                _ => WindowState::BorderlessFullScreen,
            };
        }
        if self.window.is_minimized().unwrap_or(false) {
            return WindowState::Minimized;
        }
        if self.window.is_maximized() {
            return WindowState::Maximized;
        }
        if !self.window.is_visible().unwrap_or(true) {
            return WindowState::Hidden;
        }
        WindowState::Normal
    }

    fn set_state(&mut self, state: WindowState) {
        match state {
            WindowState::Normal => {
                self.window.set_fullscreen(None);
                self.window.set_minimized(false);
                self.window.set_maximized(false);
                self.window.set_visible(true);
            }
            WindowState::FullScreen | WindowState::BorderlessFullScreen => {
                self.window.set_visible(true);
                self.window
                    .set_fullscreen(Some(Fullscreen::Borderless(None)));
            }
            WindowState::Maximized => {
                self.window.set_fullscreen(None);
                self.window.set_visible(true);
                self.window.set_maximized(true);
            }
            WindowState::Minimized => {
                self.window.set_minimized(true);
            }
            WindowState::Hidden => {
                self.window.set_visible(false);
            }
        }
        self.state.set(state);
    }

    fn exists(&self) -> bool {
        !self.signals.close_requested.get()
    }

    fn pump_events(&mut self) {
        self.pump.pump();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for WinitWindow {
    fn drop(&mut self) {
        self.pump.signals.borrow_mut().remove(&self.id);
    }
}
