use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

/// Shader uniform block: projection, camera, world and normal matrices plus
/// light and eye positions.
///
/// Laid out for a uniform buffer: the 3x3 normal matrix is stored as three
/// columns padded to 16 bytes, positions as padded 4-vectors.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub proj_matrix: [[f32; 4]; 4],
    pub cam_matrix: [[f32; 4]; 4],
    pub world_matrix: [[f32; 4]; 4],
    pub normal_world_matrix: [[f32; 4]; 3],
    pub light_pos: [f32; 4],
    pub camera_pos: [f32; 4],
}

impl Uniforms {
    pub fn new(projection: Mat4, camera: Mat4, world: Mat4, light: Vec3, eye: Vec3) -> Self {
        Self {
            proj_matrix: projection.to_cols_array_2d(),
            cam_matrix: camera.to_cols_array_2d(),
            world_matrix: world.to_cols_array_2d(),
            normal_world_matrix: padded_mat3(normal_matrix(world)),
            light_pos: light.extend(1.0).to_array(),
            camera_pos: eye.extend(1.0).to_array(),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.proj_matrix)
    }

    /// Same block with the projection replaced.
    pub fn with_projection(mut self, projection: Mat4) -> Self {
        self.proj_matrix = projection.to_cols_array_2d();
        self
    }
}

/// Inverse-transpose of the upper 3x3 of the world matrix.
pub fn normal_matrix(world: Mat4) -> Mat3 {
    Mat3::from_mat4(world).inverse().transpose()
}

fn padded_mat3(matrix: Mat3) -> [[f32; 4]; 3] {
    [
        matrix.x_axis.extend(0.0).to_array(),
        matrix.y_axis.extend(0.0).to_array(),
        matrix.z_axis.extend(0.0).to_array(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 272);
    }

    #[test]
    fn identity_world_gives_identity_normal_matrix() {
        assert_eq!(normal_matrix(Mat4::IDENTITY), Mat3::IDENTITY);
        let uniforms = Uniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::new(0.0, 0.0, 3.0),
        );
        assert_eq!(
            uniforms.normal_world_matrix,
            [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]]
        );
        assert_eq!(uniforms.light_pos, [0.0, 0.0, 100.0, 1.0]);
        assert_eq!(uniforms.camera_pos, [0.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn non_uniform_scale_corrects_normals() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(world) * Vec3::new(1.0, 1.0, 0.0);
        // Normals shrink along the stretched axis.
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }
}
