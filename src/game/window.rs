use anyhow::Result;

use crate::graphics::GraphicsDevice;
use crate::platform::PlatformWindow;
use crate::services::ServiceProvider;

/// Borrowed view of one window handed to its callbacks.
pub struct WindowContext<'a> {
    pub window: &'a mut dyn PlatformWindow,
    pub device: &'a mut dyn GraphicsDevice,
    pub services: &'a ServiceProvider,
}

pub type WindowCallback = Box<dyn FnMut(&mut WindowContext<'_>) -> Result<()>>;

/// A native window paired with its graphics device and a private service
/// container for per-window resources.
///
/// Behavior is attached through the three callback lists rather than
/// subclassing: `on_initialize` runs once before the first update,
/// `on_update` runs every frame, `on_exit` runs during [`dispose`].
///
/// [`dispose`]: GameWindow::dispose
pub struct GameWindow {
    // Declared ahead of the device so plain drops release user resources
    // first, same as dispose does.
    services: ServiceProvider,
    window: Box<dyn PlatformWindow>,
    device: Box<dyn GraphicsDevice>,
    on_initialize: Vec<WindowCallback>,
    on_update: Vec<WindowCallback>,
    on_exit: Vec<WindowCallback>,
    initialized: bool,
    disposed: bool,
}

impl GameWindow {
    pub fn new(window: Box<dyn PlatformWindow>, device: Box<dyn GraphicsDevice>) -> Self {
        Self {
            services: ServiceProvider::new(),
            window,
            device,
            on_initialize: Vec::new(),
            on_update: Vec::new(),
            on_exit: Vec::new(),
            initialized: false,
            disposed: false,
        }
    }

    pub fn on_initialize(
        &mut self,
        callback: impl FnMut(&mut WindowContext<'_>) -> Result<()> + 'static,
    ) -> &mut Self {
        self.on_initialize.push(Box::new(callback));
        self
    }

    pub fn on_update(
        &mut self,
        callback: impl FnMut(&mut WindowContext<'_>) -> Result<()> + 'static,
    ) -> &mut Self {
        self.on_update.push(Box::new(callback));
        self
    }

    pub fn on_exit(
        &mut self,
        callback: impl FnMut(&mut WindowContext<'_>) -> Result<()> + 'static,
    ) -> &mut Self {
        self.on_exit.push(Box::new(callback));
        self
    }

    /// Runs one frame: initialization callbacks on the first call, then the
    /// event pump, then the update callbacks.
    ///
    /// The initialized flag is only set once every initialization callback
    /// has succeeded, so a failed initialization is retried on the next
    /// update rather than silently skipped.
    pub fn update(&mut self) -> Result<()> {
        let Self {
            services,
            window,
            device,
            on_initialize,
            on_update,
            initialized,
            ..
        } = self;

        if !*initialized {
            run_callbacks(on_initialize, window.as_mut(), device.as_mut(), services)?;
            *initialized = true;
            tracing::debug!(target: "window", title = %window.title(), "window initialized");
        }

        window.pump_events();
        run_callbacks(on_update, window.as_mut(), device.as_mut(), services)
    }

    /// Tears the window down in order: exit callbacks, then the service
    /// container, then the graphics device. Later calls do nothing.
    ///
    /// A failing exit callback is reported only after the services and the
    /// device have still been torn down.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        tracing::debug!(target: "window", title = %self.window.title(), "window disposing");

        let Self {
            services,
            window,
            device,
            on_exit,
            ..
        } = self;

        let result = run_callbacks(on_exit, window.as_mut(), device.as_mut(), services);
        services.clear();
        device.release();
        result
    }

    /// Whether the native window is still open. Disposed windows no longer
    /// exist no matter what the platform says.
    pub fn exists(&self) -> bool {
        !self.disposed && self.window.exists()
    }

    pub fn window(&self) -> &dyn PlatformWindow {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> &mut dyn PlatformWindow {
        self.window.as_mut()
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn run_callbacks(
    callbacks: &mut [WindowCallback],
    window: &mut dyn PlatformWindow,
    device: &mut dyn GraphicsDevice,
    services: &ServiceProvider,
) -> Result<()> {
    let mut ctx = WindowContext {
        window,
        device,
        services,
    };
    for callback in callbacks {
        callback(&mut ctx)?;
    }
    Ok(())
}
