use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::graphics::GraphicsDeviceOptions;
use crate::platform::{WindowCreationInfo, WindowState};

/// Startup settings, loadable from a RON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub window: WindowCreationInfo,
    pub device: GraphicsDeviceOptions,
    pub target_fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "holo".to_string(),
            window: WindowCreationInfo {
                x: 100,
                y: 100,
                width: 960,
                height: 540,
                title: "Test".to_string(),
                state: WindowState::Normal,
            },
            device: GraphicsDeviceOptions {
                prefer_standard_clip_space: true,
                prefer_zero_to_one_depth_range: true,
                ..Default::default()
            },
            target_fps: 60,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        ron::from_str(&text)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    /// Loads the config when the file is present; a missing file means the
    /// defaults, a malformed one is logged and also means the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    target: "host",
                    path = %path.display(),
                    error = %err,
                    "config unusable, using defaults"
                );
                Self::default()
            }
        }
    }
}

/// Sleeps off the unspent remainder of a fixed frame budget.
pub struct FrameLimiter {
    frame_budget: Option<Duration>,
    last: Instant,
}

impl FrameLimiter {
    /// `0` disables the cap entirely.
    pub fn from_fps(fps: u32) -> Self {
        let frame_budget = (fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            frame_budget,
            last: Instant::now(),
        }
    }

    /// Sleeps until one frame budget has passed since the previous call,
    /// then rebases. An overrun rebases too instead of accumulating debt.
    pub fn wait(&mut self) {
        let Some(budget) = self.frame_budget else {
            return;
        };
        let elapsed = self.last.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
        self.last = Instant::now();
    }
}
