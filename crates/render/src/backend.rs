use crate::RenderError;
use crate::uniforms::Uniforms;

/// Fixed rasterizer state requested when the shader program is linked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    pub clear_color: [f64; 4],
    pub depth_test: bool,
    pub depth_bits: u8,
    pub cull_back_faces: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            depth_test: true,
            depth_bits: 24,
            cull_back_faces: true,
        }
    }
}

/// Attribute layout of the uploaded vertex buffer, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u64,
    pub position_offset: u64,
    pub normal_offset: u64,
}

impl VertexLayout {
    /// Three position floats followed by three normal floats.
    pub const POSITION_NORMAL: Self = Self {
        stride: 6 * std::mem::size_of::<f32>() as u64,
        position_offset: 0,
        normal_offset: 3 * std::mem::size_of::<f32>() as u64,
    };
}

/// What one call to [`GraphicsBackend::draw`] should put on screen.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub vertex_count: u32,
    pub fps_label: &'a str,
}

/// Graphics API surface consumed by the render loop.
///
/// Implementations own their device resources; dropping the backend releases
/// them.
pub trait GraphicsBackend {
    /// Compile and link the shader program. Must succeed before anything else.
    fn create_program(&mut self, raster: &RasterState) -> Result<(), RenderError>;

    /// Upload the vertex bytes verbatim and declare their layout.
    fn upload_vertices(&mut self, data: &[u8], layout: VertexLayout) -> Result<(), RenderError>;

    /// The drawable changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Push the full uniform block.
    fn write_uniforms(&mut self, uniforms: &Uniforms);

    /// Clear color and depth, then draw `vertex_count` vertices as a triangle list.
    /// Returns `false` when the surface was unavailable and nothing was presented.
    fn draw(&mut self, frame: Frame<'_>) -> Result<bool, RenderError>;
}
