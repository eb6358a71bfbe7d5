use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::graphics::{
    DepthFormat, GraphicsBackend, GraphicsDevice, GraphicsDeviceOptions, GraphicsDeviceProvider,
};
use crate::platform::{PlatformWindow, WinitWindow};

/// Adapter probing is expensive, so each backend is probed at most once per
/// process and the verdict is kept here.
static BACKEND_SUPPORT: Mutex<BTreeMap<GraphicsBackend, bool>> = Mutex::new(BTreeMap::new());

/// Whether a wgpu adapter exists for the given backend on this machine.
pub fn backend_supported(backend: GraphicsBackend) -> bool {
    let mut cache = BACKEND_SUPPORT.lock().unwrap();
    if let Some(&supported) = cache.get(&backend) {
        return supported;
    }

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: backend_bits(backend),
        ..Default::default()
    });
    let supported = instance
        .enumerate_adapters(backend_bits(backend))
        .into_iter()
        .next()
        .is_some();
    tracing::debug!(target: "gfx", backend = ?backend, supported, "backend probed");

    cache.insert(backend, supported);
    supported
}

/// The backend used when the caller states no preference: the platform's
/// native API first, with OpenGL as the portable fallback.
pub fn platform_default_backend() -> GraphicsBackend {
    if cfg!(target_os = "windows") {
        GraphicsBackend::Direct3D12
    } else if cfg!(target_os = "macos") {
        if backend_supported(GraphicsBackend::Metal) {
            GraphicsBackend::Metal
        } else {
            GraphicsBackend::OpenGl
        }
    } else if backend_supported(GraphicsBackend::Vulkan) {
        GraphicsBackend::Vulkan
    } else {
        GraphicsBackend::OpenGl
    }
}

/// The wgpu backend mask equivalent to one [`GraphicsBackend`].
pub fn backend_bits(backend: GraphicsBackend) -> wgpu::Backends {
    match backend {
        GraphicsBackend::Direct3D12 => wgpu::Backends::DX12,
        GraphicsBackend::Vulkan => wgpu::Backends::VULKAN,
        GraphicsBackend::Metal => wgpu::Backends::METAL,
        GraphicsBackend::OpenGl => wgpu::Backends::GL,
    }
}

/// Picks a swapchain format matching the sRGB preference, falling back to
/// the first supported format. `None` only when the surface reports no
/// formats at all.
pub fn select_surface_format(
    available: &[wgpu::TextureFormat],
    srgb_swapchain: bool,
) -> Option<wgpu::TextureFormat> {
    available
        .iter()
        .copied()
        .find(|format| format.is_srgb() == srgb_swapchain)
        .or_else(|| available.first().copied())
}

/// Vsync means `Fifo`; otherwise the lowest-latency mode the surface offers.
pub fn select_present_mode(
    available: &[wgpu::PresentMode],
    prefer_vertical_sync: bool,
) -> wgpu::PresentMode {
    if prefer_vertical_sync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

pub fn depth_texture_format(format: DepthFormat) -> wgpu::TextureFormat {
    match format {
        DepthFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        DepthFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
    }
}

/// Creates wgpu devices for windows made by
/// [`WinitWindowProvider`](crate::platform::WinitWindowProvider).
#[derive(Default)]
pub struct WgpuDeviceProvider;

impl WgpuDeviceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl GraphicsDeviceProvider for WgpuDeviceProvider {
    fn create_device(
        &self,
        window: &dyn PlatformWindow,
        options: &GraphicsDeviceOptions,
        preferred_backend: Option<GraphicsBackend>,
    ) -> Result<Box<dyn GraphicsDevice>> {
        let window = window
            .as_any()
            .downcast_ref::<WinitWindow>()
            .ok_or_else(|| anyhow!("window must be a winit window"))?;

        let backend = preferred_backend.unwrap_or_else(platform_default_backend);
        tracing::info!(
            target: "gfx",
            backend = ?backend,
            preferred = preferred_backend.is_some(),
            "creating graphics device"
        );

        let device =
            pollster::block_on(WgpuDevice::new(window.native_handle(), options, backend))?;
        Ok(Box::new(device))
    }
}

struct DepthAttachment {
    format: wgpu::TextureFormat,
    view: wgpu::TextureView,
}

/// A wgpu device, queue, and configured surface for one window.
pub struct WgpuDevice {
    backend: GraphicsBackend,
    surface: Option<wgpu::Surface<'static>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: Option<DepthAttachment>,
    released: bool,
}

impl WgpuDevice {
    async fn new(
        window: Arc<winit::window::Window>,
        options: &GraphicsDeviceOptions,
        backend: GraphicsBackend,
    ) -> Result<Self> {
        let size = window.inner_size();

        let flags = if options.debug {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::default()
        };
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: backend_bits(backend),
            flags,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| anyhow!("failed to create surface: {err}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no suitable {backend:?} adapter found"))?;
        tracing::info!(
            target: "gfx",
            adapter = %adapter.get_info().name,
            backend = ?backend,
            "adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("holo-graphics-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = select_surface_format(&caps.formats, options.srgb_swapchain)
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let present_mode = select_present_mode(&caps.present_modes, options.prefer_vertical_sync);
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::CompositeAlphaMode::Opaque)
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = options.depth_format.map(|depth_format| {
            let format = depth_texture_format(depth_format);
            DepthAttachment {
                format,
                view: create_depth_view(&device, &config, format),
            }
        });

        // The clip-space preferences take no work here: wgpu already fixes
        // standard clip-space orientation and zero-to-one depth on every
        // backend it drives.
        Ok(Self {
            backend,
            surface: Some(surface),
            device,
            queue,
            config,
            depth,
            released: false,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(|depth| &depth.view)
    }

    /// The next swapchain texture. After [`GraphicsDevice::release`] the
    /// surface is gone and this reports `Lost`.
    pub fn current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        match &self.surface {
            Some(surface) => surface.get_current_texture(),
            None => Err(wgpu::SurfaceError::Lost),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.released || width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
        if let Some(depth) = &mut self.depth {
            depth.view = create_depth_view(&self.device, &self.config, depth.format);
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    fn backend(&self) -> GraphicsBackend {
        self.backend
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.depth = None;
        // The surface must go before the window it draws to.
        self.surface = None;
        let _ = self.device.poll(wgpu::Maintain::Wait);
        tracing::debug!(target: "gfx", backend = ?self.backend, "graphics device released");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("holo-depth-texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
