//! Render loop: renderer-agnostic state machine for the bowtie demo.
//!
//! # Invariants
//! - The mesh is uploaded once, at init, byte for byte.
//! - Uniforms are pushed only when the camera state is dirty.
//! - No frame is drawn before the shader program links.
//!
//! GPU access goes through [`GraphicsBackend`]; [`RecordingBackend`] stands in
//! for a GPU in headless runs and tests.

mod backend;
mod camera;
mod error;
mod fps;
mod recording;
mod uniforms;
mod view;

pub use backend::{Frame, GraphicsBackend, RasterState, VertexLayout};
pub use camera::{
    CameraState, EYE, FAR_PLANE, FOV_Y_DEGREES, LIGHT_POSITION, NEAR_PLANE, TARGET, UP,
};
pub use error::RenderError;
pub use fps::{FpsCounter, subsec_millis_now};
pub use recording::{BackendCall, RecordingBackend};
pub use uniforms::{Uniforms, normal_matrix};
pub use view::{FrameReport, GlView, Phase};
