use crate::error::Error;
use crate::shaders::{ProgramSource, ShaderSource};
use gfx_hal::{image as i, pass::Subpass, prelude::*, pso, Backend};
use glam::Mat4;
use std::io::Cursor;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

use super::vertex::Vertex;

const ENTRY_NAME: &str = "main";

/// Bytes of push-constant space holding the `MVP` matrix.
pub const TRANSFORM_SIZE: u32 = 64;

/// Column-major words of `mvp`, as the vertex shader reads them.
pub fn transform_constants(mvp: &Mat4) -> [u32; 16] {
    let mut words = [0u32; 16];
    for (word, value) in words.iter_mut().zip(mvp.to_cols_array().iter()) {
        *word = value.to_bits();
    }
    words
}

/// One linked shader program: vertex + fragment stage over the shared
/// vertex layout, with alpha blending.
pub struct Pipeline<'a, B: Backend> {
    device: &'a B::Device,
    pub pipeline: ManuallyDrop<B::GraphicsPipeline>,
    pub pipeline_layout: ManuallyDrop<B::PipelineLayout>,
    pub uses_transform: bool,
}

impl<'a, B: Backend> Pipeline<'a, B> {
    pub fn new(
        device: &'a B::Device,
        program: &ProgramSource,
        render_pass: &B::RenderPass,
        samples: i::NumSamples,
        uses_transform: bool,
    ) -> Result<Self, Error> {
        log::debug!("linking program {}", program.name());

        let push_constants = if uses_transform {
            vec![(pso::ShaderStageFlags::VERTEX, 0..TRANSFORM_SIZE)]
        } else {
            vec![]
        };
        let pipeline_layout = unsafe {
            device.create_pipeline_layout(iter::empty::<B::DescriptorSetLayout>(), &push_constants)
        }
        .map_err(Error::resource("pipeline layout"))?;

        let pipeline = unsafe {
            Self::link(device, program, render_pass, samples, &pipeline_layout)
        };
        match pipeline {
            Ok(pipeline) => Ok(Pipeline {
                device,
                pipeline: ManuallyDrop::new(pipeline),
                pipeline_layout: ManuallyDrop::new(pipeline_layout),
                uses_transform,
            }),
            Err(err) => {
                unsafe { device.destroy_pipeline_layout(pipeline_layout) };
                Err(err)
            }
        }
    }

    unsafe fn link(
        device: &B::Device,
        program: &ProgramSource,
        render_pass: &B::RenderPass,
        samples: i::NumSamples,
        pipeline_layout: &B::PipelineLayout,
    ) -> Result<B::GraphicsPipeline, Error> {
        let vs_module = Self::load_spirv(device, &program.vertex)?;
        let fs_module = match Self::load_spirv(device, &program.fragment) {
            Ok(module) => module,
            Err(err) => {
                device.destroy_shader_module(vs_module);
                return Err(err);
            }
        };

        let shader_entries = pso::GraphicsShaderSet {
            vertex: pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &vs_module,
                specialization: pso::Specialization::default(),
            },
            hull: None,
            domain: None,
            geometry: None,
            fragment: Some(pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &fs_module,
                specialization: pso::Specialization::default(),
            }),
        };

        let subpass = Subpass {
            index: 0,
            main_pass: render_pass,
        };

        let mut pipeline_desc = pso::GraphicsPipelineDesc::new(
            shader_entries,
            pso::Primitive::TriangleList,
            pso::Rasterizer::FILL,
            pipeline_layout,
            subpass,
        );
        pipeline_desc.blender.targets.push(pso::ColorBlendDesc {
            mask: pso::ColorMask::ALL,
            blend: Some(pso::BlendState::ALPHA),
        });
        if samples > 1 {
            pipeline_desc.multisampling = Some(pso::Multisampling {
                rasterization_samples: samples,
                sample_shading: None,
                sample_mask: !0,
                alpha_coverage: false,
                alpha_to_one: false,
            });
        }

        pipeline_desc.vertex_buffers.push(pso::VertexBufferDesc {
            binding: 0,
            stride: Vertex::STRIDE,
            rate: pso::VertexInputRate::Vertex,
        });
        pipeline_desc.attributes.push(pso::AttributeDesc {
            location: 0,
            binding: 0,
            element: pso::Element {
                format: Vertex::FORMAT,
                offset: 0,
            },
        });

        let pipeline = device
            .create_graphics_pipeline(&pipeline_desc, None)
            .map_err(Error::shader(program.name()));

        device.destroy_shader_module(vs_module);
        device.destroy_shader_module(fs_module);
        pipeline
    }

    unsafe fn load_spirv(device: &B::Device, shader: &ShaderSource) -> Result<B::ShaderModule, Error> {
        let spirv = pso::read_spirv(Cursor::new(shader.spirv)).map_err(Error::shader(shader.name))?;
        device
            .create_shader_module(&spirv)
            .map_err(Error::shader(shader.name))
    }
}

impl<'a, B: Backend> Drop for Pipeline<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_graphics_pipeline(ManuallyDrop::into_inner(ptr::read(&self.pipeline)));
            self.device
                .destroy_pipeline_layout(ManuallyDrop::into_inner(ptr::read(
                    &self.pipeline_layout,
                )));
        }
    }
}
