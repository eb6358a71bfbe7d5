pub mod wgpu;

pub use self::wgpu::{WgpuDevice, WgpuDeviceProvider};

use std::any::Any;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::platform::PlatformWindow;

/// Rendering APIs a graphics device can sit on top of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GraphicsBackend {
    Direct3D12,
    Vulkan,
    Metal,
    OpenGl,
}

/// Depth attachment formats a swapchain can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthFormat {
    Depth32Float,
    Depth24PlusStencil8,
}

/// Device and swapchain knobs. Everything is opt-in; the default asks for
/// the least machinery the platform can provide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsDeviceOptions {
    pub prefer_vertical_sync: bool,
    pub depth_format: Option<DepthFormat>,
    pub srgb_swapchain: bool,
    pub prefer_standard_clip_space: bool,
    pub prefer_zero_to_one_depth_range: bool,
    pub debug: bool,
}

/// A live rendering device bound to one window.
pub trait GraphicsDevice {
    fn backend(&self) -> GraphicsBackend;

    /// Tears down GPU state ahead of the window itself. Safe to call more
    /// than once; later calls do nothing.
    fn release(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Builds a [`GraphicsDevice`] for a window made by the matching
/// [`WindowProvider`](crate::platform::WindowProvider).
pub trait GraphicsDeviceProvider {
    fn create_device(
        &self,
        window: &dyn PlatformWindow,
        options: &GraphicsDeviceOptions,
        preferred_backend: Option<GraphicsBackend>,
    ) -> Result<Box<dyn GraphicsDevice>>;
}
