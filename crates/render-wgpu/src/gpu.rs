use bowtie_render::{
    Frame, GraphicsBackend, RasterState, RenderError, Uniforms, VertexLayout,
};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::overlay::FpsOverlay;
use crate::program::{ShaderProgram, depth_format};

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
const GL_TO_WGPU_DEPTH: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu implementation of the render loop's graphics surface.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_format: wgpu::TextureFormat,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,
    program: Option<ShaderProgram>,
    uniforms: Option<UniformBinding>,
    vertex_buffer: Option<wgpu::Buffer>,
    overlay: FpsOverlay,
}

impl WgpuBackend {
    /// Acquire an adapter and device for `surface` and configure it at
    /// `width` x `height`.
    pub fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::Device("no compatible graphics adapter".into()))?;

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            driver = %info.driver,
            driver_info = %info.driver_info,
            "graphics adapter selected"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("bowtie_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let default_depth = depth_format(RasterState::default().depth_bits);
        let depth_view =
            Self::create_depth_texture(&device, default_depth, config.width, config.height);
        let overlay = FpsOverlay::new(&device, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_format: default_depth,
            depth_view,
            clear_color: wgpu::Color::BLACK,
            program: None,
            uniforms: None,
            vertex_buffer: None,
            overlay,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Context the FPS overlay runs in; build the window's egui state on it.
    pub fn egui_context(&self) -> egui::Context {
        self.overlay.context().clone()
    }

    /// Window input for the overlay's next frame.
    pub fn set_overlay_input(&mut self, raw_input: egui::RawInput) {
        self.overlay.set_input(raw_input);
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_program(&mut self, raster: &RasterState) -> Result<(), RenderError> {
        let program = ShaderProgram::link(
            &self.device,
            self.config.format,
            raster,
            VertexLayout::POSITION_NORMAL,
        )?;

        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                glam::Vec3::ZERO,
                glam::Vec3::ZERO,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &program.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        if program.depth_format != self.depth_format {
            self.depth_format = program.depth_format;
            self.depth_view = Self::create_depth_texture(
                &self.device,
                self.depth_format,
                self.config.width,
                self.config.height,
            );
        }
        let [r, g, b, a] = raster.clear_color;
        self.clear_color = wgpu::Color { r, g, b, a };
        self.uniforms = Some(UniformBinding { buffer, bind_group });
        self.program = Some(program);
        Ok(())
    }

    fn upload_vertices(&mut self, data: &[u8], layout: VertexLayout) -> Result<(), RenderError> {
        let Some(program) = &self.program else {
            return Err(RenderError::NotInitialized);
        };
        if layout != program.vertex_layout {
            return Err(RenderError::BufferUpload(format!(
                "vertex layout {layout:?} does not match the linked program"
            )));
        }
        if data.len() as u64 % layout.stride != 0 {
            return Err(RenderError::InvalidMesh(data.len()));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bowtie_vertex_buffer"),
            contents: data,
            usage: wgpu::BufferUsages::VERTEX,
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::BufferUpload(err.to_string()));
        }
        self.vertex_buffer = Some(buffer);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_texture(
            &self.device,
            self.depth_format,
            self.config.width,
            self.config.height,
        );
    }

    fn write_uniforms(&mut self, uniforms: &Uniforms) {
        let Some(binding) = &self.uniforms else {
            tracing::warn!("uniform write before the shader program was linked");
            return;
        };
        let block = uniforms.with_projection(GL_TO_WGPU_DEPTH * uniforms.projection());
        self.queue
            .write_buffer(&binding.buffer, 0, bytemuck::bytes_of(&block));
    }

    fn draw(&mut self, frame: Frame<'_>) -> Result<bool, RenderError> {
        let (Some(program), Some(binding), Some(vertex_buffer)) =
            (&self.program, &self.uniforms, &self.vertex_buffer)
        else {
            return Err(RenderError::NotInitialized);
        };

        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout; skipping frame");
                return Ok(false);
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mesh_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &binding.bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.draw(0..frame.vertex_count, 0..1);
        }

        let overlay_commands = self.overlay.record(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            [self.config.width, self.config.height],
            frame.fps_label,
        );

        self.queue.submit(
            overlay_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        self.overlay.release_freed();
        output.present();
        Ok(true)
    }
}
