use crate::RenderError;
use crate::backend::{Frame, GraphicsBackend, RasterState, VertexLayout};
use crate::uniforms::Uniforms;

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateProgram(RasterState),
    UploadVertices { bytes: usize, layout: VertexLayout },
    Resize { width: u32, height: u32 },
    WriteUniforms,
    Draw { vertex_count: u32, fps_label: String },
    SkippedDraw,
}

/// Backend that keeps everything in memory instead of talking to a GPU.
///
/// Useful for headless runs and for checking what the render loop sends:
/// the uploaded bytes and the last uniform block can be read back.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    vertex_data: Vec<u8>,
    uniforms: Option<Uniforms>,
    link_failure: Option<String>,
    unavailable_frames: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose program link always fails with `reason`.
    pub fn failing_link(reason: impl Into<String>) -> Self {
        Self {
            link_failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Make the next `frames` draws find no surface to present to.
    pub fn drop_next_frames(&mut self, frames: u32) {
        self.unavailable_frames = frames;
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Bytes currently held in the vertex buffer.
    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    pub fn uniforms(&self) -> Option<&Uniforms> {
        self.uniforms.as_ref()
    }

    pub fn uniform_writes(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::WriteUniforms))
    }

    pub fn draws(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Draw { .. }))
    }

    /// Human-readable summary of what was recorded.
    pub fn summary(&self) -> String {
        let program = self
            .calls
            .iter()
            .any(|call| matches!(call, BackendCall::CreateProgram(_)));
        let last_label = self.calls.iter().rev().find_map(|call| match call {
            BackendCall::Draw { fps_label, .. } => Some(fps_label.as_str()),
            _ => None,
        });
        let mut out = String::new();
        out.push_str(&format!("program linked: {program}\n"));
        out.push_str(&format!("vertex buffer: {} bytes\n", self.vertex_data.len()));
        out.push_str(&format!("uniform writes: {}\n", self.uniform_writes()));
        out.push_str(&format!("draw calls: {}\n", self.draws()));
        out.push_str(&format!("fps label: {}\n", last_label.unwrap_or("-")));
        out
    }

    fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_program(&mut self, raster: &RasterState) -> Result<(), RenderError> {
        if let Some(reason) = &self.link_failure {
            return Err(RenderError::ProgramLink(reason.clone()));
        }
        self.calls.push(BackendCall::CreateProgram(*raster));
        Ok(())
    }

    fn upload_vertices(&mut self, data: &[u8], layout: VertexLayout) -> Result<(), RenderError> {
        self.vertex_data = data.to_vec();
        self.calls.push(BackendCall::UploadVertices {
            bytes: data.len(),
            layout,
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(BackendCall::Resize { width, height });
    }

    fn write_uniforms(&mut self, uniforms: &Uniforms) {
        self.uniforms = Some(*uniforms);
        self.calls.push(BackendCall::WriteUniforms);
    }

    fn draw(&mut self, frame: Frame<'_>) -> Result<bool, RenderError> {
        if self.unavailable_frames > 0 {
            self.unavailable_frames -= 1;
            self.calls.push(BackendCall::SkippedDraw);
            return Ok(false);
        }
        self.calls.push(BackendCall::Draw {
            vertex_count: frame.vertex_count,
            fps_label: frame.fps_label.to_string(),
        });
        Ok(true)
    }
}
