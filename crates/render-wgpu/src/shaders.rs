/// WGSL source for the lit mesh: per-pixel ambient + diffuse + specular.
pub const PHONG_SHADER: &str = r#"
struct Uniforms {
    proj_matrix: mat4x4<f32>,
    cam_matrix: mat4x4<f32>,
    world_matrix: mat4x4<f32>,
    normal_world_matrix: mat3x3<f32>,
    light_pos: vec4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) vert: vec3<f32>,
    @location(1) vert_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = uniforms.world_matrix * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.vert = world_pos.xyz;
    out.vert_normal = uniforms.normal_world_matrix * vertex.normal;
    out.clip_position = uniforms.proj_matrix * uniforms.cam_matrix * world_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let l = normalize(uniforms.light_pos.xyz - in.vert);
    let nl = max(dot(normalize(in.vert_normal), l), 0.0);
    var specular = 0.0;
    if nl > 0.0 {
        let r = reflect(-l, in.vert_normal);
        let v = normalize(uniforms.camera_pos.xyz - in.vert);
        let rv = max(dot(r, v), 0.0);
        specular = pow(rv, 50.0);
    }
    let specular_color = specular * vec3<f32>(1.0, 1.0, 1.0);
    let color = vec3<f32>(0.4, 0.4, 1.0);
    let ambient_color = 0.2 * color;
    let diffuse_color = 0.8 * nl * color;
    let lit = clamp(specular_color + ambient_color + diffuse_color, vec3<f32>(0.0), vec3<f32>(1.0));
    return vec4<f32>(lit, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_declares_entry_points() {
        assert!(PHONG_SHADER.contains("fn vs_main"));
        assert!(PHONG_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn shader_reads_every_uniform() {
        for name in [
            "proj_matrix",
            "cam_matrix",
            "world_matrix",
            "normal_world_matrix",
            "light_pos",
            "camera_pos",
        ] {
            assert!(PHONG_SHADER.contains(&format!("uniforms.{name}")), "{name} unused");
        }
    }

    #[test]
    fn shader_validates_and_uniform_block_matches_rust_layout() {
        let module = naga::front::wgsl::parse_str(PHONG_SHADER).expect("WGSL should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .expect("WGSL should validate");

        let entry_points: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        assert_eq!(entry_points, ["vs_main", "fs_main"]);

        let (_, uniforms) = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some("Uniforms"))
            .expect("shader declares a Uniforms struct");
        assert_eq!(
            uniforms.inner.size(module.to_ctx()) as usize,
            std::mem::size_of::<bowtie_render::Uniforms>()
        );
    }
}
