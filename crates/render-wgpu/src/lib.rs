//! wgpu render backend for the bowtie demo.
//!
//! Implements [`bowtie_render::GraphicsBackend`]: one Phong-lit pipeline, one
//! vertex buffer, one uniform buffer, a 24-bit depth buffer and an egui FPS
//! label drawn over the mesh.
//!
//! # Invariants
//! - Shader compile and link failures are returned, never left to the
//!   device's uncaptured-error handler.
//! - The projection arrives in OpenGL clip convention and is remapped to
//!   wgpu depth only at upload.

mod gpu;
mod overlay;
mod program;
mod shaders;

pub use gpu::WgpuBackend;
pub use overlay::FpsOverlay;
pub use program::{ShaderProgram, depth_format};
pub use shaders::PHONG_SHADER;
