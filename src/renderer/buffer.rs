use crate::error::Error;
use gfx_hal::{buffer, prelude::*, Backend, Limits};
use std::mem::{self, ManuallyDrop};
use std::ptr;

/// Vertex buffer holding a borrowed slice that is uploaded once.
pub struct Buffer<'a, B: Backend, T> {
    pub device: &'a B::Device,
    pub buf: ManuallyDrop<B::Buffer>,
    pub content: &'a [T],
    pub len: u64,
}

impl<'a, B: Backend, T> Buffer<'a, B, T> {
    pub fn new(device: &'a B::Device, content: &'a [T], limits: &Limits) -> Result<Self, Error> {
        let buffer_len = content.len() as u64 * mem::size_of::<T>() as u64;
        assert_ne!(buffer_len, 0);
        let memory_size = aligned_size(buffer_len, limits.non_coherent_atom_size as u64);

        let buf = unsafe { device.create_buffer(memory_size, buffer::Usage::VERTEX) }
            .map_err(Error::resource("vertex buffer"))?;

        Ok(Buffer {
            device,
            buf: ManuallyDrop::new(buf),
            content,
            len: buffer_len,
        })
    }
}

impl<'a, B: Backend, T> Drop for Buffer<'a, B, T> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.buf)))
        }
    }
}

/// Rounds `len` up to a multiple of the non-coherent atom size.
pub(super) fn aligned_size(len: u64, atom: u64) -> u64 {
    if atom == 0 {
        return len;
    }
    ((len + atom - 1) / atom) * atom
}

#[cfg(test)]
mod tests {
    use super::aligned_size;

    #[test]
    fn rounds_up_to_the_atom() {
        assert_eq!(aligned_size(72, 64), 128);
        assert_eq!(aligned_size(64, 64), 64);
        assert_eq!(aligned_size(1, 256), 256);
    }

    #[test]
    fn zero_atom_keeps_length() {
        assert_eq!(aligned_size(72, 0), 72);
    }
}
