use crate::error::Error;
use gfx_hal::{adapter::Adapter, format as f, prelude::*, pso, window, Backend};

pub struct Swapchain<'a, B: Backend> {
    device: &'a B::Device,
    adapter: &'a Adapter<B>,
    pub viewport: pso::Viewport,
    pub dims: window::Extent2D,
    pub surface: &'a mut B::Surface,
    pub format: f::Format,
}

impl<'a, B: Backend> Swapchain<'a, B> {
    pub fn new(
        device: &'a B::Device,
        surface: &'a mut B::Surface,
        adapter: &'a Adapter<B>,
        dims: window::Extent2D,
    ) -> Result<Self, Error> {
        let formats = surface.supported_formats(&adapter.physical_device);
        let format = choose_format(formats.as_deref());

        let mut swapchain = Swapchain {
            device,
            surface,
            adapter,
            viewport: viewport(dims),
            format,
            dims,
        };

        swapchain.recreate()?;
        Ok(swapchain)
    }

    pub fn recreate(&mut self) -> Result<(), Error> {
        let caps = self.surface.capabilities(&self.adapter.physical_device);

        let mut swap_config = window::SwapchainConfig::from_caps(&caps, self.format, self.dims);
        swap_config.present_mode = window::PresentMode::FIFO;
        let extent = swap_config.extent;
        unsafe {
            self.surface
                .configure_swapchain(&self.device, swap_config)
                .map_err(Error::resource("swapchain"))?;
        }

        log::debug!("swapchain configured at {}x{}", extent.width, extent.height);
        self.dims = extent;
        self.viewport = viewport(extent);
        Ok(())
    }
}

impl<'a, B: Backend> Drop for Swapchain<'a, B> {
    fn drop(&mut self) {
        unsafe { self.surface.unconfigure_swapchain(&self.device) }
    }
}

/// Prefers an sRGB format, then whatever the surface lists first.
fn choose_format(formats: Option<&[f::Format]>) -> f::Format {
    formats
        .and_then(|formats| {
            formats
                .iter()
                .find(|format| format.base_format().1 == f::ChannelType::Srgb)
                .or_else(|| formats.first())
                .copied()
        })
        .unwrap_or(f::Format::Rgba8Srgb)
}

fn viewport(extent: window::Extent2D) -> pso::Viewport {
    pso::Viewport {
        rect: pso::Rect {
            x: 0,
            y: 0,
            w: extent.width as _,
            h: extent.height as _,
        },
        depth: 0.0..1.0,
    }
}
