use bowtie_geometry::{FLOATS_PER_VERTEX, Geometry};

use crate::RenderError;
use crate::backend::{Frame, GraphicsBackend, RasterState, VertexLayout};
use crate::camera::CameraState;
use crate::fps::FpsCounter;

/// Lifecycle phase of a [`GlView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, no GPU resources yet.
    Created,
    /// Program linked and mesh uploaded; frames may be drawn.
    Ready,
}

/// What happened during one [`GlView::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// `false` when the surface was unavailable; the frame is not counted.
    pub presented: bool,
    pub uniforms_pushed: bool,
    pub vertices_drawn: u32,
    pub fps: Option<u32>,
}

/// The render loop: owns the mesh, camera state and FPS counter and drives a
/// backend through init, resize and per-frame callbacks.
pub struct GlView<B> {
    backend: B,
    geometry: Geometry,
    camera: CameraState,
    fps: FpsCounter,
    raster: RasterState,
    phase: Phase,
}

impl<B: GraphicsBackend> GlView<B> {
    /// A view over the bowtie mesh. `now_millis` seeds the FPS counter.
    pub fn new(backend: B, now_millis: u32) -> Self {
        Self::with_geometry(backend, Geometry::bowtie(), now_millis)
    }

    pub fn with_geometry(backend: B, geometry: Geometry, now_millis: u32) -> Self {
        Self {
            backend,
            geometry,
            camera: CameraState::new(),
            fps: FpsCounter::new(now_millis),
            raster: RasterState::default(),
            phase: Phase::Created,
        }
    }

    /// Link the shader program and upload the mesh.
    pub fn on_init(&mut self) -> Result<(), RenderError> {
        self.backend.create_program(&self.raster)?;
        tracing::info!("shader program linked");

        let bytes = self.geometry.as_bytes();
        let record = FLOATS_PER_VERTEX * std::mem::size_of::<f32>();
        if bytes.len() % record != 0 {
            return Err(RenderError::InvalidMesh(bytes.len()));
        }
        self.backend
            .upload_vertices(bytes, VertexLayout::POSITION_NORMAL)?;
        tracing::info!(
            vertices = self.geometry.vertex_count(),
            bytes = bytes.len(),
            "mesh uploaded"
        );

        self.phase = Phase::Ready;
        Ok(())
    }

    /// The drawable is now `width` x `height` pixels.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if !self.camera.resize(width, height) {
            tracing::debug!(width, height, "ignoring zero-area resize");
            return;
        }
        self.backend.resize(width, height);
    }

    /// Draw one frame observed at sub-second timestamp `now_millis`.
    pub fn on_frame(&mut self, now_millis: u32) -> Result<FrameReport, RenderError> {
        if self.phase != Phase::Ready {
            return Err(RenderError::NotInitialized);
        }
        let mut fps = self.fps.tick(now_millis);

        let uniforms = self.camera.take_uniforms();
        if let Some(uniforms) = &uniforms {
            self.backend.write_uniforms(uniforms);
        }

        let vertex_count = self.geometry.vertex_count() as u32;
        let label = self.fps.label();
        let presented = self.backend.draw(Frame {
            vertex_count,
            fps_label: &label,
        })?;
        if !presented {
            self.fps.retract();
            fps = fps.and(self.fps.published());
        }

        Ok(FrameReport {
            presented,
            uniforms_pushed: uniforms.is_some(),
            vertices_drawn: if presented { vertex_count } else { 0 },
            fps,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BackendCall, RecordingBackend};

    fn ready_view() -> GlView<RecordingBackend> {
        let mut view = GlView::new(RecordingBackend::new(), 0);
        view.on_init().unwrap();
        view.on_resize(800, 600);
        view
    }

    #[test]
    fn init_links_then_uploads() {
        let mut view = GlView::new(RecordingBackend::new(), 0);
        assert_eq!(view.phase(), Phase::Created);
        view.on_init().unwrap();
        assert_eq!(view.phase(), Phase::Ready);

        let calls = view.backend().calls();
        assert_eq!(calls[0], BackendCall::CreateProgram(RasterState::default()));
        assert_eq!(
            calls[1],
            BackendCall::UploadVertices {
                bytes: 144,
                layout: VertexLayout::POSITION_NORMAL,
            }
        );
    }

    #[test]
    fn uploaded_bytes_round_trip() {
        let view = ready_view();
        let source = Geometry::bowtie();
        assert_eq!(view.backend().vertex_data(), source.as_bytes());
        let floats: Vec<f32> = view
            .backend()
            .vertex_data()
            .chunks_exact(4)
            .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        assert_eq!(floats.as_slice(), source.as_floats());
    }

    #[test]
    fn frame_before_init_fails() {
        let mut view = GlView::new(RecordingBackend::new(), 0);
        assert!(matches!(view.on_frame(10), Err(RenderError::NotInitialized)));
        assert_eq!(view.backend().draws(), 0);
    }

    #[test]
    fn link_failure_aborts_init() {
        let mut view = GlView::new(RecordingBackend::failing_link("bad shader"), 0);
        assert!(matches!(view.on_init(), Err(RenderError::ProgramLink(_))));
        assert_eq!(view.phase(), Phase::Created);
        assert!(view.backend().vertex_data().is_empty());
    }

    #[test]
    fn uniforms_pushed_only_when_dirty() {
        let mut view = ready_view();
        let first = view.on_frame(10).unwrap();
        assert!(first.presented);
        assert!(first.uniforms_pushed);
        assert_eq!(first.vertices_drawn, 6);

        for t in [20, 30, 40] {
            assert!(!view.on_frame(t).unwrap().uniforms_pushed);
        }
        assert_eq!(view.backend().uniform_writes(), 1);

        view.on_resize(1920, 1080);
        assert!(view.on_frame(50).unwrap().uniforms_pushed);
        assert!(!view.on_frame(60).unwrap().uniforms_pushed);
        assert_eq!(view.backend().uniform_writes(), 2);
        assert_eq!(view.backend().draws(), 6);
    }

    #[test]
    fn pushed_uniforms_match_camera() {
        let mut view = ready_view();
        view.on_frame(10).unwrap();
        let uniforms = view.backend().uniforms().copied().unwrap();
        assert_eq!(uniforms.proj_matrix, view.camera().projection().to_cols_array_2d());
        assert_eq!(uniforms.cam_matrix, view.camera().view().to_cols_array_2d());
        assert_eq!(uniforms.camera_pos, [0.0, 0.0, 3.0, 1.0]);
        assert_eq!(uniforms.light_pos, [0.0, 0.0, 100.0, 1.0]);
    }

    #[test]
    fn fps_label_reaches_backend() {
        let mut view = GlView::new(RecordingBackend::new(), 10);
        view.on_init().unwrap();
        view.on_resize(800, 600);
        view.on_frame(40).unwrap();
        view.on_frame(70).unwrap();
        let report = view.on_frame(5).unwrap();
        assert_eq!(report.fps, Some(3));
        assert_eq!(view.fps().frames(), 0);

        let last = view.backend().calls().last().cloned();
        assert_eq!(
            last,
            Some(BackendCall::Draw {
                vertex_count: 6,
                fps_label: "3 fps".to_string(),
            })
        );
    }

    #[test]
    fn skipped_frame_is_not_counted() {
        let mut view = GlView::new(RecordingBackend::new(), 10);
        view.on_init().unwrap();
        view.on_resize(800, 600);
        view.on_frame(40).unwrap();

        view.backend_mut().drop_next_frames(1);
        let skipped = view.on_frame(70).unwrap();
        assert!(!skipped.presented);
        assert_eq!(skipped.vertices_drawn, 0);
        assert_eq!(view.fps().frames(), 1);
        assert_eq!(view.backend().calls().last(), Some(&BackendCall::SkippedDraw));

        let report = view.on_frame(5).unwrap();
        assert!(report.presented);
        assert_eq!(report.fps, Some(2));
        assert_eq!(view.backend().draws(), 2);
    }

    #[test]
    fn skipped_rollover_frame_lowers_published_rate() {
        let mut view = GlView::new(RecordingBackend::new(), 10);
        view.on_init().unwrap();
        view.on_frame(40).unwrap();
        view.on_frame(70).unwrap();

        view.backend_mut().drop_next_frames(1);
        let report = view.on_frame(5).unwrap();
        assert_eq!(report.fps, Some(2));
        assert_eq!(view.fps().label(), "2 fps");
    }

    #[test]
    fn resize_reaches_backend() {
        let mut view = GlView::new(RecordingBackend::new(), 0);
        view.on_init().unwrap();
        view.on_resize(800, 600);
        assert_eq!(
            view.backend().calls().last(),
            Some(&BackendCall::Resize {
                width: 800,
                height: 600,
            })
        );
    }

    #[test]
    fn zero_area_resize_skips_backend() {
        let mut view = ready_view();
        let before = view.backend().calls().len();
        view.on_resize(0, 0);
        assert_eq!(view.backend().calls().len(), before);
    }
}
