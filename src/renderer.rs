use gfx_hal::{
    adapter, buffer as b, command, format as f, image as i, pass, pool,
    prelude::*,
    queue::{family::QueueFamilyId, Submission},
    window, Backend,
};

use std::borrow::Borrow;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

mod buffer;
mod memory;
mod pipeline;
mod swapchain;
mod target;
pub mod vertex;

use crate::error::Error;
use crate::frame::Frame;
use crate::shaders::ProgramSource;
use buffer::Buffer;
use memory::Memory;
use pipeline::{transform_constants, Pipeline};
use swapchain::Swapchain;
use target::ColorTarget;
pub use target::select_samples;
use vertex::{Vertex, TRIANGLES};

const FRAMES_IN_FLIGHT: usize = 2;

/// Everything the renderer needs to know about the programs it runs.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig<'p> {
    pub dims: window::Extent2D,
    pub samples: i::NumSamples,
    pub programs: &'p [ProgramSource; 2],
    pub uses_transform: bool,
}

pub struct Renderer<'a, B: Backend> {
    frame: usize,
    device: &'a B::Device,
    memory_types: Vec<adapter::MemoryType>,
    samples: i::NumSamples,
    command_buffers: Vec<B::CommandBuffer>,
    submission_complete_semaphores: Vec<B::Semaphore>,
    submission_complete_fences: Vec<B::Fence>,
    framebuffers: Vec<Option<B::Framebuffer>>,
    command_pool: ManuallyDrop<B::CommandPool>,
    memory: ManuallyDrop<Memory<'a, B, Vertex>>,
    target: Option<ColorTarget<'a, B>>,
    swapchain: ManuallyDrop<Swapchain<'a, B>>,
    render_pass: ManuallyDrop<B::RenderPass>,
    pipelines: ManuallyDrop<Vec<Pipeline<'a, B>>>,
}

impl<'a, B> Renderer<'a, B>
where
    B: Backend,
{
    pub fn new(
        surface: &'a mut B::Surface,
        adapter: &'a adapter::Adapter<B>,
        device: &'a B::Device,
        family: QueueFamilyId,
        config: RendererConfig<'_>,
    ) -> Result<Self, Error> {
        let memory_types = adapter.physical_device.memory_properties().memory_types;
        let limits = adapter.physical_device.limits();

        let samples = select_samples(config.samples, limits.framebuffer_color_sample_counts);
        if samples != config.samples {
            log::warn!(
                "{}x multisampling unavailable, using {}x",
                config.samples,
                samples
            );
        }

        let vertex_buffer = Buffer::new(device, &TRIANGLES, &limits)?;
        let memory = Memory::new(vertex_buffer, &memory_types)?;
        let swapchain = Swapchain::new(device, surface, adapter, config.dims)?;
        let target = Self::create_target(device, &memory_types, &swapchain, samples)?;
        let render_pass = Self::create_render_pass(device, swapchain.format, samples)?;

        let rest = Self::create_pipelines(device, &render_pass, samples, &config).and_then(
            |pipelines| {
                let frame_objects = Self::create_frame_objects(device, family)?;
                Ok((pipelines, frame_objects))
            },
        );
        let (pipelines, (command_pool, command_buffers, semaphores, fences)) = match rest {
            Ok(rest) => rest,
            Err(err) => {
                unsafe { device.destroy_render_pass(render_pass) };
                return Err(err);
            }
        };

        log::info!(
            "renderer ready: {}x{} {:?}, {}x multisampling",
            swapchain.dims.width,
            swapchain.dims.height,
            swapchain.format,
            samples
        );

        Ok(Renderer {
            device,
            memory_types,
            samples,
            submission_complete_semaphores: semaphores,
            submission_complete_fences: fences,
            framebuffers: (0..FRAMES_IN_FLIGHT).map(|_| None).collect(),
            command_pool: ManuallyDrop::new(command_pool),
            memory: ManuallyDrop::new(memory),
            target,
            swapchain: ManuallyDrop::new(swapchain),
            render_pass: ManuallyDrop::new(render_pass),
            pipelines: ManuallyDrop::new(pipelines),
            command_buffers,
            frame: 0,
        })
    }

    pub fn samples(&self) -> i::NumSamples {
        self.samples
    }

    /// Rebuilds the swapchain and multisample target at a new size.
    pub fn resize(&mut self, dims: window::Extent2D) {
        self.swapchain.dims = dims;
        self.recreate_swapchain();
    }

    pub fn render(&mut self, queue: &mut B::CommandQueue, frame: &Frame) {
        let frame_idx = self.frame % FRAMES_IN_FLIGHT;

        unsafe {
            let fence = &self.submission_complete_fences[frame_idx];
            if let Err(err) = self.device.wait_for_fence(fence, !0) {
                log::warn!("skipping frame, fence unusable: {:?}", err);
                return;
            }
            if let Some(old) = self.framebuffers[frame_idx].take() {
                self.device.destroy_framebuffer(old);
            }
        }

        let surface_image = unsafe {
            match self.swapchain.surface.acquire_image(!0) {
                Ok((image, _)) => image,
                Err(_) => {
                    self.recreate_swapchain();
                    return;
                }
            }
        };

        let frame_buffer = {
            let surface_view: &B::ImageView = surface_image.borrow();
            let mut attachments = Vec::with_capacity(2);
            if let Some(target) = &self.target {
                attachments.push(&*target.view);
            }
            attachments.push(surface_view);
            unsafe {
                self.device.create_framebuffer(
                    &self.render_pass,
                    attachments,
                    i::Extent {
                        width: self.swapchain.dims.width,
                        height: self.swapchain.dims.height,
                        depth: 1,
                    },
                )
            }
        };
        let frame_buffer = match frame_buffer {
            Ok(frame_buffer) => frame_buffer,
            Err(err) => {
                log::warn!("skipping frame, no framebuffer: {:?}", err);
                return;
            }
        };

        let attachment_count = if self.target.is_some() { 2 } else { 1 };
        let clear_values = vec![
            command::ClearValue {
                color: command::ClearColor {
                    float32: frame.clear_color,
                },
            };
            attachment_count
        ];

        let fence = &self.submission_complete_fences[frame_idx];
        if let Err(err) = unsafe { self.device.reset_fence(fence) } {
            log::warn!("skipping frame, fence not reset: {:?}", err);
            unsafe { self.device.destroy_framebuffer(frame_buffer) };
            return;
        }

        let cmd_buffer = &mut self.command_buffers[frame_idx];
        unsafe {
            cmd_buffer.reset(false);
            cmd_buffer.begin_primary(command::CommandBufferFlags::ONE_TIME_SUBMIT);
            cmd_buffer.set_viewports(0, &[self.swapchain.viewport.clone()]);
            cmd_buffer.set_scissors(0, &[self.swapchain.viewport.rect]);
            cmd_buffer.bind_vertex_buffers(
                0,
                iter::once((&*self.memory.buffer.buf, b::SubRange::WHOLE)),
            );
            cmd_buffer.begin_render_pass(
                &self.render_pass,
                &frame_buffer,
                self.swapchain.viewport.rect,
                &clear_values,
                command::SubpassContents::Inline,
            );
            for draw in frame.draws.iter() {
                let pipeline = &self.pipelines[draw.program.index()];
                cmd_buffer.bind_graphics_pipeline(&pipeline.pipeline);
                if let (true, Some(mvp)) = (pipeline.uses_transform, draw.transform) {
                    cmd_buffer.push_graphics_constants(
                        &pipeline.pipeline_layout,
                        gfx_hal::pso::ShaderStageFlags::VERTEX,
                        0,
                        &transform_constants(&mvp),
                    );
                }
                cmd_buffer.draw(draw.vertices.clone(), 0..1);
            }
            cmd_buffer.end_render_pass();
            cmd_buffer.finish();

            let submission = Submission {
                command_buffers: iter::once(&*cmd_buffer),
                wait_semaphores: None,
                signal_semaphores: iter::once(&self.submission_complete_semaphores[frame_idx]),
            };

            queue.submit(
                submission,
                Some(&self.submission_complete_fences[frame_idx]),
            );

            let result = queue.present_surface(
                &mut self.swapchain.surface,
                surface_image,
                Some(&self.submission_complete_semaphores[frame_idx]),
            );

            self.framebuffers[frame_idx] = Some(frame_buffer);

            if result.is_err() {
                self.recreate_swapchain();
            }
        }

        self.frame += 1;
    }

    fn recreate_swapchain(&mut self) {
        if let Err(err) = self.device.wait_idle() {
            log::warn!("device not idle before swapchain rebuild: {:?}", err);
        }
        unsafe {
            for frame_buffer in self.framebuffers.iter_mut().filter_map(Option::take) {
                self.device.destroy_framebuffer(frame_buffer);
            }
        }
        self.target = None;

        let rebuilt = self.swapchain.recreate().and_then(|()| {
            Self::create_target(self.device, &self.memory_types, &self.swapchain, self.samples)
        });
        match rebuilt {
            Ok(target) => self.target = target,
            Err(err) => log::warn!("swapchain rebuild failed: {}", err),
        }
    }

    fn create_target(
        device: &'a B::Device,
        memory_types: &[adapter::MemoryType],
        swapchain: &Swapchain<'a, B>,
        samples: i::NumSamples,
    ) -> Result<Option<ColorTarget<'a, B>>, Error> {
        if samples <= 1 {
            return Ok(None);
        }
        ColorTarget::new(device, memory_types, swapchain.format, swapchain.dims, samples).map(Some)
    }

    fn create_render_pass(
        device: &B::Device,
        format: f::Format,
        samples: i::NumSamples,
    ) -> Result<B::RenderPass, Error> {
        let present = pass::Attachment {
            format: Some(format),
            samples: 1,
            ops: pass::AttachmentOps::new(
                pass::AttachmentLoadOp::Clear,
                pass::AttachmentStoreOp::Store,
            ),
            stencil_ops: pass::AttachmentOps::DONT_CARE,
            layouts: i::Layout::Undefined..i::Layout::Present,
        };

        let render_pass = if samples > 1 {
            let color = pass::Attachment {
                samples,
                ops: pass::AttachmentOps::new(
                    pass::AttachmentLoadOp::Clear,
                    pass::AttachmentStoreOp::DontCare,
                ),
                layouts: i::Layout::Undefined..i::Layout::ColorAttachmentOptimal,
                ..present.clone()
            };
            let resolve = pass::Attachment {
                ops: pass::AttachmentOps::new(
                    pass::AttachmentLoadOp::DontCare,
                    pass::AttachmentStoreOp::Store,
                ),
                ..present
            };
            let subpass = pass::SubpassDesc {
                colors: &[(0, i::Layout::ColorAttachmentOptimal)],
                depth_stencil: None,
                inputs: &[],
                resolves: &[(1, i::Layout::ColorAttachmentOptimal)],
                preserves: &[],
            };
            unsafe {
                device.create_render_pass(
                    vec![color, resolve],
                    iter::once(subpass),
                    iter::empty::<pass::SubpassDependency>(),
                )
            }
        } else {
            let subpass = pass::SubpassDesc {
                colors: &[(0, i::Layout::ColorAttachmentOptimal)],
                depth_stencil: None,
                inputs: &[],
                resolves: &[],
                preserves: &[],
            };
            unsafe {
                device.create_render_pass(
                    iter::once(present),
                    iter::once(subpass),
                    iter::empty::<pass::SubpassDependency>(),
                )
            }
        };

        render_pass.map_err(Error::resource("render pass"))
    }

    fn create_pipelines(
        device: &'a B::Device,
        render_pass: &B::RenderPass,
        samples: i::NumSamples,
        config: &RendererConfig<'_>,
    ) -> Result<Vec<Pipeline<'a, B>>, Error> {
        config
            .programs
            .iter()
            .map(|program| {
                Pipeline::new(device, program, render_pass, samples, config.uses_transform)
            })
            .collect()
    }

    #[allow(clippy::type_complexity)]
    fn create_frame_objects(
        device: &B::Device,
        family: QueueFamilyId,
    ) -> Result<
        (
            B::CommandPool,
            Vec<B::CommandBuffer>,
            Vec<B::Semaphore>,
            Vec<B::Fence>,
        ),
        Error,
    > {
        let mut command_pool = unsafe {
            device.create_command_pool(family, pool::CommandPoolCreateFlags::RESET_INDIVIDUAL)
        }
        .map_err(Error::resource("command pool"))?;

        let command_buffers = (0..FRAMES_IN_FLIGHT)
            .map(|_| unsafe { command_pool.allocate_one(command::Level::Primary) })
            .collect();

        let sync = (0..FRAMES_IN_FLIGHT)
            .map(|_| device.create_semaphore())
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::resource("semaphore"))
            .and_then(|semaphores| {
                let fences = (0..FRAMES_IN_FLIGHT)
                    .map(|_| device.create_fence(true))
                    .collect::<Result<Vec<_>, _>>();
                match fences {
                    Ok(fences) => Ok((semaphores, fences)),
                    Err(err) => {
                        for s in semaphores {
                            unsafe { device.destroy_semaphore(s) };
                        }
                        Err(Error::resource("fence")(err))
                    }
                }
            });

        match sync {
            Ok((semaphores, fences)) => Ok((command_pool, command_buffers, semaphores, fences)),
            Err(err) => {
                unsafe { device.destroy_command_pool(command_pool) };
                Err(err)
            }
        }
    }
}

impl<'a, B: Backend> Drop for Renderer<'a, B> {
    fn drop(&mut self) {
        let device = &self.device;
        if let Err(err) = device.wait_idle() {
            log::warn!("device not idle at shutdown: {:?}", err);
        }
        unsafe {
            for frame_buffer in self.framebuffers.iter_mut().filter_map(Option::take) {
                device.destroy_framebuffer(frame_buffer);
            }
            ManuallyDrop::drop(&mut self.memory);
            self.command_buffers.clear();
            device.destroy_command_pool(ManuallyDrop::into_inner(ptr::read(&self.command_pool)));
            for s in self.submission_complete_semaphores.drain(..) {
                device.destroy_semaphore(s);
            }

            for f in self.submission_complete_fences.drain(..) {
                device.destroy_fence(f);
            }

            ManuallyDrop::drop(&mut self.pipelines);
            device.destroy_render_pass(ManuallyDrop::into_inner(ptr::read(&self.render_pass)));
            self.target = None;
            ManuallyDrop::drop(&mut self.swapchain);
        }
        log::debug!("renderer resources released");
    }
}
