use crate::error::Error;
use gfx_hal::{adapter::MemoryType, memory as m, prelude::*, Backend, MemoryTypeId};
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

use super::buffer::Buffer;

/// Host-visible memory bound to a buffer and filled with its content.
pub struct Memory<'a, B: Backend, T> {
    pub buffer: ManuallyDrop<Buffer<'a, B, T>>,
    memory: ManuallyDrop<B::Memory>,
}

impl<'a, B: Backend, T> Memory<'a, B, T> {
    pub fn new(mut buffer: Buffer<'a, B, T>, memory_types: &[MemoryType]) -> Result<Self, Error> {
        let memory = Self::upload(&mut buffer, memory_types)?;
        Ok(Memory {
            buffer: ManuallyDrop::new(buffer),
            memory: ManuallyDrop::new(memory),
        })
    }

    fn upload(buffer: &mut Buffer<'a, B, T>, memory_types: &[MemoryType]) -> Result<B::Memory, Error> {
        let device = buffer.device;
        unsafe {
            let buffer_req = device.get_buffer_requirements(&buffer.buf);
            let upload_type = find_memory_type(
                memory_types,
                buffer_req.type_mask,
                m::Properties::CPU_VISIBLE,
            )
            .ok_or_else(|| Error::Resource {
                what: "vertex memory",
                reason: "no host-visible memory type".into(),
            })?;
            let memory = device
                .allocate_memory(upload_type, buffer_req.size)
                .map_err(Error::resource("vertex memory"))?;

            if let Err(err) = Self::fill(device, &memory, buffer) {
                device.free_memory(memory);
                return Err(err);
            }
            Ok(memory)
        }
    }

    unsafe fn fill(
        device: &B::Device,
        memory: &B::Memory,
        buffer: &mut Buffer<'a, B, T>,
    ) -> Result<(), Error> {
        device
            .bind_buffer_memory(memory, 0, &mut buffer.buf)
            .map_err(Error::resource("vertex memory binding"))?;
        let mapping = device
            .map_memory(memory, m::Segment::ALL)
            .map_err(Error::resource("vertex memory mapping"))?;
        ptr::copy_nonoverlapping(
            buffer.content.as_ptr() as *const u8,
            mapping,
            buffer.len as usize,
        );
        let flushed = device
            .flush_mapped_memory_ranges(iter::once((memory, m::Segment::ALL)))
            .map_err(Error::resource("vertex memory flush"));
        device.unmap_memory(memory);
        flushed
    }
}

impl<'a, B: Backend, T> Drop for Memory<'a, B, T> {
    fn drop(&mut self) {
        unsafe {
            let device = self.buffer.device;
            ManuallyDrop::drop(&mut self.buffer);
            device.free_memory(ManuallyDrop::into_inner(ptr::read(&self.memory)))
        }
    }
}

/// First memory type allowed by `type_mask` that has all of `properties`.
pub(super) fn find_memory_type(
    memory_types: &[MemoryType],
    type_mask: u64,
    properties: m::Properties,
) -> Option<MemoryTypeId> {
    memory_types
        .iter()
        .enumerate()
        .position(|(id, mem_type)| {
            type_mask & (1 << id) != 0 && mem_type.properties.contains(properties)
        })
        .map(MemoryTypeId::from)
}
