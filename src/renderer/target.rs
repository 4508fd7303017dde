use crate::error::Error;
use gfx_hal::{
    adapter::MemoryType, format as f, image as i, memory as m, prelude::*, window, Backend,
};
use std::mem::ManuallyDrop;
use std::ptr;

use super::memory::find_memory_type;

/// Picks the largest power-of-two sample count not above `requested`
/// that the `supported` mask allows, falling back to 1.
pub fn select_samples(requested: i::NumSamples, supported: i::NumSamples) -> i::NumSamples {
    let mut samples = requested.next_power_of_two();
    if samples > requested {
        samples >>= 1;
    }
    while samples > 1 {
        if supported & samples != 0 {
            return samples;
        }
        samples >>= 1;
    }
    1
}

/// Transient multisampled colour image, resolved into the swapchain image
/// at the end of the pass.
pub struct ColorTarget<'a, B: Backend> {
    device: &'a B::Device,
    image: ManuallyDrop<B::Image>,
    memory: ManuallyDrop<B::Memory>,
    pub view: ManuallyDrop<B::ImageView>,
}

impl<'a, B: Backend> ColorTarget<'a, B> {
    pub fn new(
        device: &'a B::Device,
        memory_types: &[MemoryType],
        format: f::Format,
        dims: window::Extent2D,
        samples: i::NumSamples,
    ) -> Result<Self, Error> {
        unsafe {
            let mut image = device
                .create_image(
                    i::Kind::D2(dims.width, dims.height, 1, samples),
                    1,
                    format,
                    i::Tiling::Optimal,
                    i::Usage::COLOR_ATTACHMENT | i::Usage::TRANSIENT_ATTACHMENT,
                    i::ViewCapabilities::empty(),
                )
                .map_err(Error::resource("multisample image"))?;

            let req = device.get_image_requirements(&image);
            let memory = match find_memory_type(memory_types, req.type_mask, m::Properties::DEVICE_LOCAL)
                .ok_or_else(|| Error::Resource {
                    what: "multisample memory",
                    reason: "no device-local memory type".into(),
                })
                .and_then(|ty| {
                    device
                        .allocate_memory(ty, req.size)
                        .map_err(Error::resource("multisample memory"))
                }) {
                Ok(memory) => memory,
                Err(err) => {
                    device.destroy_image(image);
                    return Err(err);
                }
            };

            let view = device
                .bind_image_memory(&memory, 0, &mut image)
                .map_err(Error::resource("multisample memory binding"))
                .and_then(|()| {
                    device
                        .create_image_view(
                            &image,
                            i::ViewKind::D2,
                            format,
                            f::Swizzle::NO,
                            i::SubresourceRange {
                                aspects: f::Aspects::COLOR,
                                levels: 0..1,
                                layers: 0..1,
                            },
                        )
                        .map_err(Error::resource("multisample image view"))
                });
            let view = match view {
                Ok(view) => view,
                Err(err) => {
                    device.destroy_image(image);
                    device.free_memory(memory);
                    return Err(err);
                }
            };

            Ok(ColorTarget {
                device,
                image: ManuallyDrop::new(image),
                memory: ManuallyDrop::new(memory),
                view: ManuallyDrop::new(view),
            })
        }
    }
}

impl<'a, B: Backend> Drop for ColorTarget<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_image_view(ManuallyDrop::into_inner(ptr::read(&self.view)));
            self.device
                .destroy_image(ManuallyDrop::into_inner(ptr::read(&self.image)));
            self.device
                .free_memory(ManuallyDrop::into_inner(ptr::read(&self.memory)));
        }
    }
}
