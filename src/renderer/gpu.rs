use glam::Vec3;
use log::{info, warn};

use crate::model::{Letter, LetterGeometry};
use crate::renderer::camera::SceneCamera;
use crate::renderer::scene::RenderState;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LetterUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

/// GPU-resident geometry for one letter. The vertex buffers are uploaded
/// once at setup and never rewritten; only the uniform buffer changes per
/// frame.
pub struct LetterBuffers {
    pub letter: Letter,
    position_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    object_index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pub vertex_count: u32,
    pub centroid: Vec3,
}

impl LetterBuffers {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        geometry: &LetterGeometry,
    ) -> Self {
        let letter = geometry.letter;
        let vertex_count = geometry.vertex_count() as u32;

        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Letter Position Buffer"),
            size: (geometry.vertices.len() * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&position_buffer, 0, bytemuck::cast_slice(&geometry.vertices));

        let normal_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Letter Normal Buffer"),
            size: (geometry.normals.len() * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&normal_buffer, 0, bytemuck::cast_slice(&geometry.normals));

        // Constant per-vertex letter index; the shader's color key.
        let object_indices = vec![letter.index() as f32; vertex_count as usize];
        let object_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Letter Object Index Buffer"),
            size: (object_indices.len() * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&object_index_buffer, 0, bytemuck::cast_slice(&object_indices));

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Letter Uniform Buffer"),
            size: std::mem::size_of::<LetterUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Letter Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            letter,
            position_buffer,
            normal_buffer,
            object_index_buffer,
            uniform_buffer,
            bind_group,
            vertex_count,
            centroid: geometry.centroid(),
        }
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    letter_pipeline: wgpu::RenderPipeline,
    letter_bind_group_layout: wgpu::BindGroupLayout,
    letters: [Option<LetterBuffers>; 3],

    depth_texture: wgpu::TextureView,
}

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn object_index_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 4,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32,
        }],
    }
}

impl GpuState {
    pub async fn new(window: std::sync::Arc<winit::window::Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no compatible graphics adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
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
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Letter Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let letter_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Letter Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Letter Pipeline Layout"),
            bind_group_layouts: &[&letter_bind_group_layout],
            push_constant_ranges: &[],
        });

        let letter_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Letter Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_letter"),
                buffers: &[position_layout(), normal_layout(), object_index_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_letter"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            letter_pipeline,
            letter_bind_group_layout,
            letters: [None, None, None],
            depth_texture,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    /// Creates the write-once letter buffers. Called once, after the model
    /// is sliced; letters absent from `geometries` stay empty.
    pub fn upload_letters(&mut self, geometries: &[LetterGeometry]) {
        for geometry in geometries {
            let buffers = LetterBuffers::new(
                &self.device,
                &self.queue,
                &self.letter_bind_group_layout,
                geometry,
            );
            info!(
                "letter {}: {} vertices, centroid ({:.2}, {:.2}, {:.2})",
                geometry.letter.name(),
                buffers.vertex_count,
                buffers.centroid.x,
                buffers.centroid.y,
                buffers.centroid.z
            );
            self.letters[geometry.letter.index()] = Some(buffers);
        }
    }

    pub fn letter_vertex_counts(&self) -> [Option<u32>; 3] {
        std::array::from_fn(|i| self.letters[i].as_ref().map(|l| l.vertex_count))
    }

    /// Draws every present letter in one pass. A missing letter is logged
    /// and skipped; it never aborts the others.
    pub fn render_letters(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        camera: &SceneCamera,
        state: &RenderState,
    ) {
        let projection = camera.projection_matrix(state.projection()).to_cols_array_2d();
        let view_matrix = camera.view_matrix().to_cols_array_2d();

        for slot in self.letters.iter().flatten() {
            let uniform = LetterUniform {
                projection,
                view: view_matrix,
                model: state
                    .model_matrix(slot.letter, slot.centroid)
                    .to_cols_array_2d(),
            };
            self.queue
                .write_buffer(&slot.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Letter Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.letter_pipeline);

        for (index, slot) in self.letters.iter().enumerate() {
            let Some(buffers) = slot else {
                warn!("no geometry for letter {}", Letter::ALL[index].name());
                continue;
            };

            render_pass.set_bind_group(0, &buffers.bind_group, &[]);
            render_pass.set_vertex_buffer(0, buffers.position_buffer.slice(..));
            render_pass.set_vertex_buffer(1, buffers.normal_buffer.slice(..));
            render_pass.set_vertex_buffer(2, buffers.object_index_buffer.slice(..));
            render_pass.draw(0..buffers.vertex_count, 0..1);
        }
    }

    /// Clear-only pass used while no model is loaded.
    pub fn render_clear(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }
}
