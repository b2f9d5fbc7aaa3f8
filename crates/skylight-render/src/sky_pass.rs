//! Offscreen sky pass: draws the sky material into a face or an
//! equirectangular map.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use skylight_sky::{SkyMaterialParams, SkyUniform};

use crate::cube::CUBE_FACES;
use crate::gpu::GpuContext;

/// WGSL source for the sky shader.
pub const SKY_SHADER_SOURCE: &str = include_str!("sky.wgsl");

/// How the sky pass maps pixels to view directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkyProjection {
    /// Through an inverse view-projection matrix.
    Perspective,
    /// Longitude across, latitude down.
    Equirect,
}

/// Per-draw uniform, 112 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyPassUniform {
    pub inv_view_proj: [[f32; 4]; 4],
    pub sky: SkyUniform,
    /// x = projection (0 perspective, 1 equirect), yzw = padding.
    pub projection: [f32; 4],
}

static_assertions::assert_eq_size!(SkyPassUniform, [u8; 112]);

impl SkyPassUniform {
    pub fn perspective(sky: &SkyMaterialParams, view_proj: Mat4) -> Self {
        Self {
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            sky: sky.to_uniform(),
            projection: [0.0; 4],
        }
    }

    pub fn equirect(sky: &SkyMaterialParams) -> Self {
        Self {
            inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky: sky.to_uniform(),
            projection: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn projection(&self) -> SkyProjection {
        if self.projection[0] > 0.5 {
            SkyProjection::Equirect
        } else {
            SkyProjection::Perspective
        }
    }
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<SkyPassUniform>() as u64;

/// Sky pipeline with one uniform slot per cube face.
pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    slot_stride: u64,
}

impl SkyPass {
    pub fn new(ctx: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky-shader"),
            source: wgpu::ShaderSource::Wgsl(SKY_SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let slot_stride = ctx.uniform_slot_stride(UNIFORM_SIZE);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sky-uniform"),
            size: slot_stride * u64::from(CUBE_FACES),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-bind-group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE),
                }),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            slot_stride,
        }
    }

    /// Upload the uniform for draw `slot`. Slots are independent until the
    /// next submit.
    pub fn write_slot(&self, queue: &wgpu::Queue, slot: u32, uniform: &SkyPassUniform) {
        debug_assert!(slot < CUBE_FACES);
        queue.write_buffer(
            &self.uniform_buffer,
            self.slot_stride * u64::from(slot),
            bytemuck::cast_slice(&[*uniform]),
        );
    }

    /// Record a full-screen sky draw into `target` using uniform `slot`.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        slot: u32,
        label: &str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        let offset = (self.slot_stride * u64::from(slot)) as u32;
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[offset]);
        pass.draw(0..3, 0..1);
    }
}
