/// Errors raised while bringing up or driving a graphics backend.
///
/// Every variant is fatal for the render loop: there is no fallback path.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("graphics device unavailable: {0}")]
    Device(String),
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),
    #[error("shader program link failed: {0}")]
    ProgramLink(String),
    #[error("vertex buffer upload failed: {0}")]
    BufferUpload(String),
    #[error("surface error: {0}")]
    Surface(String),
    #[error("mesh of {0} bytes is not a whole number of vertices")]
    InvalidMesh(usize),
    #[error("render loop used before initialization")]
    NotInitialized,
}
