pub mod window;

pub use window::{GameWindow, WindowCallback, WindowContext};

use std::rc::Rc;

use anyhow::Result;

use crate::core::FrameLimiter;
use crate::error::LifecycleError;
use crate::graphics::{GraphicsBackend, GraphicsDeviceOptions, GraphicsDeviceProvider};
use crate::host::HostId;
use crate::platform::{WindowCreationInfo, WindowProvider};
use crate::services::ServiceProvider;

/// A game proper: it names itself and, during initialization, creates its
/// windows and wires their callbacks through the [`GameContext`].
pub trait Game {
    fn name(&self) -> &str;

    fn initialize(&mut self, ctx: &mut GameContext<'_>) -> Result<()>;
}

/// What the dependency container records about the installed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub name: String,
}

/// Borrowed view of the app a [`Game`] initializes against.
pub struct GameContext<'a> {
    dependencies: &'a Rc<ServiceProvider>,
    windows: &'a mut Vec<GameWindow>,
}

impl GameContext<'_> {
    /// The app's dependency container (host services visible through it).
    pub fn dependencies(&self) -> &ServiceProvider {
        self.dependencies
    }

    /// Creates a window and its graphics device from the providers in the
    /// dependency container and adopts the pair into the app's window list.
    /// The returned handle is for wiring callbacks.
    pub fn create_window(
        &mut self,
        info: &WindowCreationInfo,
        options: &GraphicsDeviceOptions,
        preferred_backend: Option<GraphicsBackend>,
    ) -> Result<&mut GameWindow> {
        create_window_in(
            self.dependencies,
            self.windows,
            info,
            options,
            preferred_backend,
        )
    }
}

/// The installable unit: a boxed [`Game`], the host it is bound to, its
/// dependency container, and the windows created during initialization.
pub struct GameApp {
    game: Box<dyn Game>,
    host: Option<HostId>,
    dependencies: Option<Rc<ServiceProvider>>,
    windows: Vec<GameWindow>,
    limiter: FrameLimiter,
}

impl GameApp {
    pub fn new(game: impl Game + 'static) -> Self {
        Self {
            game: Box::new(game),
            host: None,
            dependencies: None,
            windows: Vec::new(),
            limiter: FrameLimiter::from_fps(60),
        }
    }

    /// Caps the main loop at `fps` passes per second; `0` removes the cap.
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.limiter = FrameLimiter::from_fps(fps);
        self
    }

    pub fn name(&self) -> &str {
        self.game.name()
    }

    /// The host this app was installed to, if any.
    pub fn installed_host(&self) -> Option<HostId> {
        self.host
    }

    pub fn dependencies(&self) -> Option<&Rc<ServiceProvider>> {
        self.dependencies.as_ref()
    }

    pub fn windows(&self) -> &[GameWindow] {
        &self.windows
    }

    /// Binds the app to a host. An app binds once for its lifetime; any
    /// later attempt is an error, even for the host it is already bound to.
    pub(crate) fn bind_host(&mut self, host: HostId) -> Result<(), LifecycleError> {
        if self.host.is_some() {
            return Err(LifecycleError::AlreadyInstalled);
        }
        self.host = Some(host);
        Ok(())
    }

    /// Gives the app its dependency container as a child of `parent`, so
    /// lookups fall through to the host's registrations.
    pub(crate) fn register_dependencies(&mut self, parent: Rc<ServiceProvider>) {
        self.dependencies = Some(Rc::new(ServiceProvider::with_parent(parent)));
    }

    /// Runs the game's [`initialize`](Game::initialize) against this app.
    pub fn initialize(&mut self) -> Result<()> {
        let Self {
            game,
            dependencies,
            windows,
            ..
        } = self;
        let dependencies = dependencies
            .as_ref()
            .ok_or(LifecycleError::DependenciesNotRegistered)?;

        tracing::info!(target: "game", game = %game.name(), "initializing game");
        let mut ctx = GameContext {
            dependencies,
            windows,
        };
        game.initialize(&mut ctx)
    }

    /// Same operation as [`GameContext::create_window`], callable once the
    /// app is installed.
    pub fn create_window(
        &mut self,
        info: &WindowCreationInfo,
        options: &GraphicsDeviceOptions,
        preferred_backend: Option<GraphicsBackend>,
    ) -> Result<&mut GameWindow> {
        let Self {
            dependencies,
            windows,
            ..
        } = self;
        let dependencies = dependencies
            .as_ref()
            .ok_or(LifecycleError::DependenciesNotRegistered)?;
        create_window_in(dependencies, windows, info, options, preferred_backend)
    }

    /// Drives every window until none is left, then returns.
    ///
    /// Each pass updates the windows in order; a window whose native handle
    /// is gone is removed and disposed in that same pass, and the sweep
    /// continues with its successor rather than skipping it. The frame
    /// limiter sleeps off whatever remains of the frame budget between
    /// passes; the pass that empties the list returns without waiting.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            target: "game",
            game = %self.game.name(),
            windows = self.windows.len(),
            "game loop starting"
        );

        while !self.windows.is_empty() {
            let mut index = 0;
            while index < self.windows.len() {
                self.windows[index].update()?;
                if self.windows[index].exists() {
                    index += 1;
                } else {
                    let mut window = self.windows.remove(index);
                    window.dispose()?;
                }
            }
            if !self.windows.is_empty() {
                self.limiter.wait();
            }
        }

        tracing::info!(target: "game", game = %self.game.name(), "game loop finished");
        Ok(())
    }
}

fn create_window_in<'a>(
    dependencies: &ServiceProvider,
    windows: &'a mut Vec<GameWindow>,
    info: &WindowCreationInfo,
    options: &GraphicsDeviceOptions,
    preferred_backend: Option<GraphicsBackend>,
) -> Result<&'a mut GameWindow> {
    let window_provider = dependencies.expect::<Rc<dyn WindowProvider>>()?;
    let device_provider = dependencies.expect::<Rc<dyn GraphicsDeviceProvider>>()?;

    let window = window_provider.create_window(info)?;
    let device = device_provider.create_device(window.as_ref(), options, preferred_backend)?;

    let index = windows.len();
    windows.push(GameWindow::new(window, device));
    Ok(&mut windows[index])
}
