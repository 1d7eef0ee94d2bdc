use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use tree_core::{MeshInstance, PointInstance, Scene, SceneInstances};

/// Photos larger than this are downscaled before upload.
pub const MAX_PHOTO_EDGE: u32 = 1024;

const STAR_SPRITE_SIZE: f32 = 1.2;
const INITIAL_PHOTO_CAPACITY: usize = 16;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    root: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
}

/// GPU side of one photo. Dropping it releases the texture.
pub struct GpuPhoto {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState<'w> {
    pub window: &'w Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sprite_pipeline: wgpu::RenderPipeline,
    photo_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Same uniforms with an identity root, for the star backdrop.
    backdrop_buffer: wgpu::Buffer,
    backdrop_bind_group: wgpu::BindGroup,
    photo_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_vb: wgpu::Buffer,
    sprite_vb: wgpu::Buffer,
    sprite_capacity: usize,
    photo_vb: wgpu::Buffer,
    photo_capacity: usize,
    sprites: Vec<PointInstance>,
    backdrop_len: usize,
    photo_models: Vec<MeshInstance>,
}

fn instance_buffer(device: &wgpu::Device, label: &str, bytes: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes.max(16) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl<'w> GpuState<'w> {
    pub async fn new(window: &'w Window, sprite_capacity: usize) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!("[render] surface {}x{} {:?}", config.width, config.height, format);

        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(tree_core::SCENE_WGSL.into()),
        });
        let photo_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("photo_shader"),
            source: wgpu::ShaderSource::Wgsl(tree_core::PHOTO_WGSL.into()),
        });

        let uniform_desc = |label: &'static str| wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        };
        let uniform_buffer = device.create_buffer(&uniform_desc("uniforms"));
        let backdrop_buffer = device.create_buffer(&uniform_desc("backdrop_uniforms"));
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_group = |label: &'static str, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let uniform_bind_group = uniform_group("uniform_bg", &uniform_buffer);
        let backdrop_bind_group = uniform_group("backdrop_bg", &backdrop_buffer);
        let photo_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("photo_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Quad vertices for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_layout = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };

        let sprite_vb = instance_buffer(
            &device,
            "sprite_vb",
            std::mem::size_of::<PointInstance>() * sprite_capacity,
        );
        let photo_vb = instance_buffer(
            &device,
            "photo_vb",
            std::mem::size_of::<MeshInstance>() * INITIAL_PHOTO_CAPACITY,
        );

        let blend_target = [Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pl"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let sprite_buffers = [
            quad_layout.clone(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 16,
                        shader_location: 3,
                    },
                ],
            },
        ];
        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&sprite_layout),
            vertex: wgpu::VertexState {
                module: &sprite_shader,
                entry_point: Some("vs_main"),
                buffers: &sprite_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &sprite_shader,
                entry_point: Some("fs_main"),
                targets: &blend_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let photo_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("photo_pl"),
            bind_group_layouts: &[&uniform_layout, &photo_layout],
            push_constant_ranges: &[],
        });
        // Model matrix columns at locations 1..=4, tint at 5
        let photo_attributes = wgpu::vertex_attr_array![
            1 => Float32x4,
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
        ];
        let photo_buffers = [
            quad_layout,
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &photo_attributes,
            },
        ];
        let photo_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("photo_pipeline"),
            layout: Some(&photo_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &photo_shader,
                entry_point: Some("vs_main"),
                buffers: &photo_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &photo_shader,
                entry_point: Some("fs_main"),
                targets: &blend_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            sprite_pipeline,
            photo_pipeline,
            uniform_buffer,
            uniform_bind_group,
            backdrop_buffer,
            backdrop_bind_group,
            photo_layout,
            sampler,
            quad_vb,
            sprite_vb,
            sprite_capacity,
            photo_vb,
            photo_capacity: INITIAL_PHOTO_CAPACITY,
            sprites: Vec::with_capacity(sprite_capacity),
            backdrop_len: 0,
            photo_models: Vec::with_capacity(INITIAL_PHOTO_CAPACITY),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload decoded RGBA pixels as a sampled texture.
    pub fn upload_photo(&self, name: &str, rgba: &image::RgbaImage) -> GpuPhoto {
        let (width, height) = rgba.dimensions();
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(name),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.photo_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        log::debug!("[render] uploaded {name} ({width}x{height})");
        GpuPhoto {
            _texture: texture,
            bind_group,
        }
    }

    fn uniforms(&self, scene: &Scene<GpuPhoto>, root: [[f32; 4]; 4]) -> Uniforms {
        let mut camera = scene.setup.camera.clone();
        camera.aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let view = camera.view_matrix();
        // Rows of the view rotation are the camera basis in world space
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
        Uniforms {
            view_proj: camera.view_proj().to_cols_array_2d(),
            root,
            cam_right: right.extend(0.0).to_array(),
            cam_up: up.extend(0.0).to_array(),
        }
    }

    /// Flatten the backdrop stars, the foliage particles, the ornaments and
    /// the star into one sprite buffer. The backdrop occupies the first
    /// `backdrop_len` entries.
    fn collect_sprites(&mut self, instances: &SceneInstances) {
        self.sprites.clear();
        self.sprites.extend_from_slice(&instances.backdrop);
        self.backdrop_len = instances.backdrop.len();
        self.sprites.extend_from_slice(&instances.particles);
        let as_sprite = |m: &MeshInstance, size: f32| {
            let model: Mat4 = m.matrix();
            PointInstance {
                position: model.w_axis.truncate().to_array(),
                size: model.x_axis.truncate().length() * size,
                color: m.color,
            }
        };
        self.sprites
            .extend(instances.ornaments.iter().map(|m| as_sprite(m, 1.0)));
        self.sprites.push(as_sprite(&instances.star, STAR_SPRITE_SIZE));

        if self.sprites.len() > self.sprite_capacity {
            self.sprite_capacity = self.sprites.len().next_power_of_two();
            self.sprite_vb = instance_buffer(
                &self.device,
                "sprite_vb",
                std::mem::size_of::<PointInstance>() * self.sprite_capacity,
            );
            log::debug!("[render] sprite buffer grown to {}", self.sprite_capacity);
        }
    }

    fn collect_photos(&mut self, instances: &SceneInstances) {
        self.photo_models.clear();
        self.photo_models
            .extend(instances.photos.iter().map(|p| p.instance));
        if self.photo_models.len() > self.photo_capacity {
            self.photo_capacity = self.photo_models.len().next_power_of_two();
            self.photo_vb = instance_buffer(
                &self.device,
                "photo_vb",
                std::mem::size_of::<MeshInstance>() * self.photo_capacity,
            );
        }
    }

    pub fn render(
        &mut self,
        scene: &Scene<GpuPhoto>,
        instances: &SceneInstances,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = self.uniforms(scene, instances.root);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        let backdrop = self.uniforms(scene, Mat4::IDENTITY.to_cols_array_2d());
        self.queue
            .write_buffer(&self.backdrop_buffer, 0, bytemuck::bytes_of(&backdrop));

        self.collect_sprites(instances);
        self.collect_photos(instances);
        self.queue
            .write_buffer(&self.sprite_vb, 0, bytemuck::cast_slice(&self.sprites));
        if !self.photo_models.is_empty() {
            self.queue
                .write_buffer(&self.photo_vb, 0, bytemuck::cast_slice(&self.photo_models));
        }

        let [r, g, b] = scene.setup.background;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let backdrop_len = self.backdrop_len as u32;
            rpass.set_pipeline(&self.sprite_pipeline);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.sprite_vb.slice(..));
            if backdrop_len > 0 {
                rpass.set_bind_group(0, &self.backdrop_bind_group, &[]);
                rpass.draw(0..6, 0..backdrop_len);
            }

            // Photos next; the glowing sprites blend over them
            if !self.photo_models.is_empty() {
                rpass.set_pipeline(&self.photo_pipeline);
                rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.photo_vb.slice(..));
                // Instances and arena iteration share ascending slot order
                for (k, (_, photo)) in scene.photos().iter().enumerate() {
                    rpass.set_bind_group(1, &photo.texture.bind_group, &[]);
                    let k = k as u32;
                    rpass.draw(0..6, k..k + 1);
                }
            }

            rpass.set_pipeline(&self.sprite_pipeline);
            rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.sprite_vb.slice(..));
            rpass.draw(0..6, backdrop_len..self.sprites.len() as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
