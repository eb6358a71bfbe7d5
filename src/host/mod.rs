use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;

use crate::error::LifecycleError;
use crate::game::{GameApp, GameInfo};
use crate::graphics::{GraphicsDeviceProvider, WgpuDeviceProvider};
use crate::platform::{WindowProvider, WinitWindowProvider};
use crate::services::ServiceProvider;

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique host identity. Clones of a host keep the same id, so an
/// app installed to one clone can be run through another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(u64);

impl HostId {
    fn next() -> Self {
        Self(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A window provider paired with a graphics device provider, plus the
/// install/run lifecycle for [`GameApp`]s.
#[derive(Clone)]
pub struct GameHost {
    id: HostId,
    window_provider: Rc<dyn WindowProvider>,
    device_provider: Rc<dyn GraphicsDeviceProvider>,
}

impl GameHost {
    /// Builds a host from explicit providers.
    pub fn new(
        window_provider: Rc<dyn WindowProvider>,
        device_provider: Rc<dyn GraphicsDeviceProvider>,
    ) -> Self {
        Self {
            id: HostId::next(),
            window_provider,
            device_provider,
        }
    }

    /// The native desktop pairing: winit windows with wgpu devices. Fails
    /// on platforms the pairing does not cover.
    pub fn desktop() -> Result<Self> {
        if !cfg!(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "linux"
        )) {
            return Err(LifecycleError::UnsupportedPlatform.into());
        }

        let window_provider = Rc::new(WinitWindowProvider::new()?);
        Ok(Self::new(window_provider, Rc::new(WgpuDeviceProvider::new())))
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    /// Installs `app` to this host: stamps the app with this host's id,
    /// then hands it a dependency container pre-loaded with the host
    /// itself, the game's [`GameInfo`], and both providers.
    pub fn install_game(&self, app: &mut GameApp) -> Result<()> {
        app.bind_host(self.id)?;

        let services = Rc::new(ServiceProvider::new());
        services.register(self.clone());
        services.register(GameInfo {
            name: app.name().to_string(),
        });
        services.register(self.window_provider.clone());
        services.register(self.device_provider.clone());
        app.register_dependencies(services);

        tracing::info!(target: "host", host = ?self.id, game = %app.name(), "game installed");
        Ok(())
    }

    /// Initializes and runs an app to completion. The app must have been
    /// installed to this host (any clone of it) first.
    pub fn run_game(&self, app: &mut GameApp) -> Result<()> {
        if app.installed_host() != Some(self.id) {
            return Err(LifecycleError::NotInstalledToHost.into());
        }

        tracing::info!(target: "host", host = ?self.id, game = %app.name(), "running game");
        app.initialize()?;
        app.run()
    }

    pub fn install_and_run(&self, app: &mut GameApp) -> Result<()> {
        self.install_game(app)?;
        self.run_game(app)
    }
}
