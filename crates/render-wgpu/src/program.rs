use bowtie_render::{RasterState, RenderError, Uniforms, VertexLayout};

use crate::shaders;

/// Linked shader program: the render pipeline plus the layout of its uniform
/// block and vertex buffer.
pub struct ShaderProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_layout: wgpu::BindGroupLayout,
    pub(crate) vertex_layout: VertexLayout,
    pub(crate) depth_format: wgpu::TextureFormat,
}

impl ShaderProgram {
    /// Compile the embedded WGSL and link it into a pipeline.
    ///
    /// Validation errors are captured rather than left to the device's
    /// uncaptured-error handler: a bad module is `ShaderCompile`, a bad
    /// pipeline is `ProgramLink`.
    pub fn link(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        raster: &RasterState,
        vertex_layout: VertexLayout,
    ) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PHONG_SHADER.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile(err.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<Uniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let attributes = [
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: vertex_layout.position_offset,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: vertex_layout.normal_offset,
                shader_location: 1,
            },
        ];

        let depth_format = depth_format(raster.depth_bits);
        let (depth_write_enabled, depth_compare) = if raster.depth_test {
            (true, wgpu::CompareFunction::Less)
        } else {
            (false, wgpu::CompareFunction::Always)
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: vertex_layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: raster.cull_back_faces.then_some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled,
                depth_compare,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ProgramLink(err.to_string()));
        }

        Ok(Self {
            pipeline,
            uniform_layout,
            vertex_layout,
            depth_format,
        })
    }
}

/// Depth attachment format for the requested depth-buffer precision.
pub fn depth_format(bits: u8) -> wgpu::TextureFormat {
    match bits {
        0..=16 => wgpu::TextureFormat::Depth16Unorm,
        17..=24 => wgpu::TextureFormat::Depth24Plus,
        _ => wgpu::TextureFormat::Depth32Float,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_raster_uses_24_bit_depth() {
        let raster = RasterState::default();
        assert_eq!(depth_format(raster.depth_bits), wgpu::TextureFormat::Depth24Plus);
    }

    #[test]
    fn depth_precision_buckets() {
        assert_eq!(depth_format(16), wgpu::TextureFormat::Depth16Unorm);
        assert_eq!(depth_format(32), wgpu::TextureFormat::Depth32Float);
    }
}
