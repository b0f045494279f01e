//! Tile renderer using wgpu.
//!
//! Draws [`DrawCommand`]s as flat-colored quads. It exists so a human can
//! play and eyeball a level, not as a production rendering pipeline.
//!
//! # Architecture
//!
//! The renderer does NOT own the event loop or the level. It implements
//! [`Surface`]: the host loop clears it with [`Surface::fill`], queues every
//! tile with [`Surface::draw`], then calls [`Surface::present`], which builds
//! the vertex buffer and submits one render pass.
//!
//! Coordinates are screen pixels with the origin at the top-left corner and
//! y growing downward, matching the tile layout (`col * 32`, `row * 32`).

use std::sync::Arc;

use nexus_tiles::color::Color;
use nexus_tiles::draw::DrawCommand;
use wgpu::util::DeviceExt;

use crate::host::Surface;

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A single vertex with 2D position and RGBA color, sent to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    /// Vertex buffer layout for the shader.
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Two CCW triangles covering `cmd`, in clip-space-ready pixel coordinates.
fn quad_vertices(cmd: &DrawCommand) -> [Vertex; VERTICES_PER_QUAD] {
    let left = cmd.x as f32;
    let top = cmd.y as f32;
    let right = left + cmd.width as f32;
    let bottom = top + cmd.height as f32;
    let color = cmd.color.to_f32_array();
    let v = |x: f32, y: f32| Vertex {
        position: [x, y],
        color,
    };
    // y points down, so (left, bottom) -> (right, bottom) -> (right, top) is
    // counter-clockwise once flipped into clip space.
    [
        v(left, bottom),
        v(right, bottom),
        v(right, top),
        v(left, bottom),
        v(right, top),
        v(left, top),
    ]
}

// ---------------------------------------------------------------------------
// ScreenCamera
// ---------------------------------------------------------------------------

/// Maps screen pixels to clip space.
///
/// Pixel `(0, 0)` is the top-left corner of the window and maps to clip
/// `(-1, 1)`; pixel `(width, height)` maps to `(1, -1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCamera {
    /// Visible width in pixels.
    pub width: f32,
    /// Visible height in pixels.
    pub height: f32,
}

impl ScreenCamera {
    /// Produce a column-major 4x4 orthographic projection matrix.
    pub fn orthographic_matrix(&self) -> [f32; 16] {
        let sx = 2.0 / self.width;
        let sy = -2.0 / self.height;

        // Column-major layout:
        // col0     col1     col2     col3
        [
            sx, 0.0, 0.0, 0.0, // column 0
            0.0, sy, 0.0, 0.0, // column 1
            0.0, 0.0, 1.0, 0.0, // column 2
            -1.0, 1.0, 0.0, 1.0, // column 3
        ]
    }

    /// Apply the projection to a pixel coordinate.
    pub fn to_clip(&self, x: f32, y: f32) -> [f32; 2] {
        let m = self.orthographic_matrix();
        [m[0] * x + m[12], m[5] * y + m[13]]
    }
}

impl Default for ScreenCamera {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer sizing
// ---------------------------------------------------------------------------

/// Maximum number of quads per frame (a 64x64 grid fits).
const MAX_QUADS: usize = 4096;
const VERTICES_PER_QUAD: usize = 6;
const MAX_VERTICES: usize = MAX_QUADS * VERTICES_PER_QUAD;

// ---------------------------------------------------------------------------
// TileRenderer
// ---------------------------------------------------------------------------

/// wgpu-backed [`Surface`].
///
/// Call [`TileRenderer::new`] with an `Arc<winit::window::Window>`. This
/// performs async adapter/device selection, surface creation, and pipeline
/// setup. If no suitable GPU is available the error is returned and the
/// caller can fall back to headless mode.
pub struct TileRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    window: Arc<winit::window::Window>,
    clear_color: Color,
    pending: Vec<DrawCommand>,
    /// The screen-space camera; tracks the window size.
    pub camera: ScreenCamera,
}

impl TileRenderer {
    /// Initialize wgpu: surface, device, queue, pipeline.
    ///
    /// This is an async function because wgpu adapter/device selection is
    /// asynchronous. Call with `.await` or use `pollster::block_on`.
    ///
    /// # Errors
    ///
    /// Returns an error if no suitable GPU adapter or device is available.
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self, anyhow::Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("nexus_tile_renderer"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tile_renderer_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera = ScreenCamera {
            width: width as f32,
            height: height as f32,
        };
        let camera_matrix = camera.orthographic_matrix();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::cast_slice(&camera_matrix),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tile_renderer_pipeline_layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tile_renderer_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex_buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            camera_buffer,
            camera_bind_group,
            window,
            clear_color: Color::BLACK,
            pending: Vec::new(),
            camera,
        })
    }

    /// Build the vertex list for a batch of draw commands.
    ///
    /// Pure and GPU-free, so it can be checked headless. Commands past the
    /// buffer capacity are dropped.
    fn build_vertices(commands: &[DrawCommand]) -> Vec<Vertex> {
        let mut vertices = Vec::with_capacity(commands.len().min(MAX_QUADS) * VERTICES_PER_QUAD);
        for cmd in commands.iter().take(MAX_QUADS) {
            vertices.extend_from_slice(&quad_vertices(cmd));
        }
        vertices
    }

    /// Render a frame from draw commands and present it.
    ///
    /// # Errors
    ///
    /// Returns a [`wgpu::SurfaceError`] if the surface cannot provide an
    /// output texture (e.g., window minimized, surface lost).
    pub fn render(&mut self, commands: &[DrawCommand]) -> Result<(), wgpu::SurfaceError> {
        let camera_matrix = self.camera.orthographic_matrix();
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&camera_matrix));

        if commands.len() > MAX_QUADS {
            tracing::warn!(
                requested = commands.len(),
                max = MAX_QUADS,
                "too many quads for one frame; extra tiles not drawn"
            );
        }
        let vertices = Self::build_vertices(commands);
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tile_renderer_encoder"),
            });

        let [r, g, b, a] = self.clear_color.to_f32_array();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tile_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            let vertex_count = vertices.len() as u32;
            if vertex_count > 0 {
                render_pass.draw(0..vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Resize the surface when the window size changes.
    ///
    /// Zero-sized requests (minimized window) are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.camera.width = new_size.width as f32;
            self.camera.height = new_size.height as f32;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Get a reference to the window.
    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }
}

impl Surface for TileRenderer {
    type Error = wgpu::SurfaceError;

    fn fill(&mut self, color: Color) {
        self.clear_color = color;
        self.pending.clear();
    }

    fn draw(&mut self, cmd: &DrawCommand) {
        self.pending.push(*cmd);
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        let commands = std::mem::take(&mut self.pending);
        let result = self.render(&commands);
        self.pending = commands;
        self.pending.clear();
        result
    }
}
