use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::game::{Game, GameContext, WindowContext};
use crate::graphics::{GraphicsDevice, GraphicsDeviceOptions, WgpuDevice};
use crate::platform::WindowCreationInfo;

/// Demo game: one window with a four-corner color quad.
pub struct QuadGame {
    window: WindowCreationInfo,
    options: GraphicsDeviceOptions,
}

impl QuadGame {
    pub fn new(window: WindowCreationInfo, options: GraphicsDeviceOptions) -> Self {
        Self { window, options }
    }
}

impl Game for QuadGame {
    fn name(&self) -> &str {
        "quad"
    }

    fn initialize(&mut self, ctx: &mut GameContext<'_>) -> Result<()> {
        let window = ctx.create_window(&self.window, &self.options, None)?;

        window.on_initialize(|ctx: &mut WindowContext| {
            let device = wgpu_device_mut(ctx.device)?;
            let renderer = QuadRenderer::new(device);
            ctx.services.register(renderer);
            Ok(())
        });

        window.on_update(|ctx: &mut WindowContext| {
            let (width, height) = ctx.window.size();
            let device = wgpu_device_mut(ctx.device)?;
            let renderer = ctx.services.expect::<QuadRenderer>()?;

            match device.current_texture() {
                Ok(frame) => {
                    renderer.draw(device, &frame);
                    frame.present();
                    Ok(())
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    device.resize(width, height);
                    Ok(())
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    Err(anyhow!("surface ran out of memory"))
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    tracing::warn!(target: "gfx", "frame acquisition timed out");
                    Ok(())
                }
            }
        });

        window.on_exit(|ctx: &mut WindowContext| {
            drop(ctx.services.remove::<QuadRenderer>());
            tracing::debug!(target: "game", "quad resources released");
            Ok(())
        });

        Ok(())
    }
}

fn wgpu_device_mut(device: &mut dyn GraphicsDevice) -> Result<&mut WgpuDevice> {
    device
        .as_any_mut()
        .downcast_mut::<WgpuDevice>()
        .ok_or_else(|| anyhow!("quad game needs a wgpu graphics device"))
}

struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl QuadRenderer {
    fn new(device: &WgpuDevice) -> Self {
        let shader = device
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("holo-quad-shader"),
                source: wgpu::ShaderSource::Wgsl(QUAD_SHADER.into()),
            });

        let pipeline_layout =
            device
                .device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("holo-quad-pipeline-layout"),
                    bind_group_layouts: &[],
                    push_constant_ranges: &[],
                });

        let pipeline = device
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("holo-quad-pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[QuadVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: device.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: Some(wgpu::IndexFormat::Uint16),
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        let vertex_buffer = device
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("holo-quad-vertices"),
                contents: bytemuck::cast_slice(QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = device
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("holo-quad-indices"),
                contents: bytemuck::cast_slice(QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
        }
    }

    fn draw(&self, device: &WgpuDevice, frame: &wgpu::SurfaceTexture) {
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("holo-quad-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("holo-quad-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        device.queue().submit(std::iter::once(encoder.finish()));
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl QuadVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex {
        position: [-0.75, 0.75],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    QuadVertex {
        position: [0.75, 0.75],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    QuadVertex {
        position: [-0.75, -0.75],
        color: [0.0, 0.0, 1.0, 1.0],
    },
    QuadVertex {
        position: [0.75, -0.75],
        color: [1.0, 1.0, 0.0, 1.0],
    },
];

const QUAD_INDICES: &[u16] = &[0, 1, 2, 3];

const QUAD_SHADER: &str = r#"
struct VertexIn {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexIn) -> VertexOut {
    var out: VertexOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
