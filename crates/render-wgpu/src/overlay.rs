/// Frames-per-second label painted over the scene with egui.
///
/// The windowing side owns the `egui_winit::State` built on [`Self::context`]
/// and hands each frame's input over with [`Self::set_input`].
pub struct FpsOverlay {
    ctx: egui::Context,
    renderer: egui_wgpu::Renderer,
    pending_input: Option<egui::RawInput>,
    pending_free: Vec<egui::TextureId>,
}

impl FpsOverlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            ctx: egui::Context::default(),
            renderer: egui_wgpu::Renderer::new(device, format, None, 1, false),
            pending_input: None,
            pending_free: Vec::new(),
        }
    }

    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }

    /// Input for the next recorded frame, usually from `take_egui_input`.
    pub fn set_input(&mut self, raw_input: egui::RawInput) {
        self.pending_input = Some(raw_input);
    }

    /// Record the label into `target`, loading what is already there.
    /// Returns extra command buffers that must be submitted before `encoder`.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        text: &str,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = frame_input(self.pending_input.take(), size_in_pixels);

        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Area::new(egui::Id::new("fps_label"))
                .fixed_pos(egui::pos2(8.0, 4.0))
                .interactable(false)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(text)
                            .monospace()
                            .size(13.0)
                            .color(egui::Color32::WHITE),
                    );
                });
        });

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let extra = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("fps_overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.pending_free
            .extend(full_output.textures_delta.free.iter().copied());
        extra
    }

    /// Release textures egui dropped during the last recorded frame. Call after submit.
    pub fn release_freed(&mut self) {
        for id in self.pending_free.drain(..) {
            self.renderer.free_texture(&id);
        }
    }
}

/// Input for one egui pass. Without window input the whole surface is the
/// screen at one pixel per point.
fn frame_input(pending: Option<egui::RawInput>, size_in_pixels: [u32; 2]) -> egui::RawInput {
    let mut raw_input = pending.unwrap_or_default();
    if raw_input.screen_rect.is_none() {
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(size_in_pixels[0] as f32, size_in_pixels[1] as f32),
        ));
    }
    raw_input
}
