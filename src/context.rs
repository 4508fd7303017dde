use crate::config::WindowConfig;
use crate::error::Error;
use gfx_hal::{
    adapter::Adapter, prelude::*, queue::QueueGroup, Backend, Features, Instance,
};
use std::any::Any;
use std::mem::ManuallyDrop;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

/// Window, surface and device for one program.
///
/// The surface is torn down through the instance when the context drops, so
/// anything borrowing from it has to be gone first.
pub struct Context<B: Backend> {
    pub config: WindowConfig,
    pub event_loop: EventLoop<()>,
    pub window: Window,
    pub surface: ManuallyDrop<B::Surface>,
    pub adapter: Adapter<B>,
    pub device: B::Device,
    pub queue_group: QueueGroup<B>,
    instance: B::Instance,
}

impl<B: Backend> Context<B> {
    pub fn new(config: WindowConfig) -> Result<Self, Error> {
        let event_loop = open_event_loop()?;
        let instance = <B::Instance as Instance<B>>::create(config.title, 1)
            .map_err(|err| Error::Backend(format!("{:?}", err)))?;

        let window = WindowBuilder::new()
            .with_title(config.title)
            .with_inner_size(winit::dpi::Size::Physical(winit::dpi::PhysicalSize::new(
                config.width,
                config.height,
            )))
            .with_min_inner_size(winit::dpi::Size::Logical(winit::dpi::LogicalSize::new(
                64.0, 64.0,
            )))
            .build(&event_loop)?;

        let surface = unsafe { instance.create_surface(&window) }
            .map_err(|err| Error::Surface(format!("{:?}", err)))?;

        let (adapter, device, queue_group) = match Self::open_device(&instance, &surface) {
            Ok(opened) => opened,
            Err(err) => {
                unsafe { instance.destroy_surface(surface) };
                return Err(err);
            }
        };
        log::info!(
            "{}: {}x{} window on {} ({:?})",
            config.title,
            config.width,
            config.height,
            adapter.info.name,
            adapter.info.device_type
        );

        Ok(Context {
            config,
            event_loop,
            window,
            surface: ManuallyDrop::new(surface),
            adapter,
            device,
            queue_group,
            instance,
        })
    }

    fn open_device(
        instance: &B::Instance,
        surface: &B::Surface,
    ) -> Result<(Adapter<B>, B::Device, QueueGroup<B>), Error> {
        let presents = |family: &B::QueueFamily| {
            surface.supports_queue_family(family) && family.queue_type().supports_graphics()
        };

        let adapter = instance
            .enumerate_adapters()
            .into_iter()
            .find(|adapter| adapter.queue_families.iter().any(|family| presents(family)))
            .ok_or_else(|| Error::Adapter("no adapter can draw to the window".into()))?;

        let mut gpu = {
            let family = adapter
                .queue_families
                .iter()
                .find(|family| presents(family))
                .ok_or_else(|| Error::Adapter("graphics queue family vanished".into()))?;
            unsafe {
                adapter
                    .physical_device
                    .open(&[(family, &[1.0][..])], Features::empty())
            }
            .map_err(|err| Error::Adapter(format!("{:?}", err)))?
        };

        let queue_group = gpu
            .queue_groups
            .pop()
            .ok_or_else(|| Error::Adapter("device opened without a queue".into()))?;
        Ok((adapter, gpu.device, queue_group))
    }
}

/// winit panics when neither X11 nor Wayland is reachable; that becomes a
/// regular startup failure here.
fn open_event_loop() -> Result<EventLoop<()>, Error> {
    catch_init(EventLoop::new).map_err(Error::Subsystem)
}

/// Runs an init step that reports failure by panicking, with the default
/// panic message suppressed.
fn catch_init<T>(init: impl FnOnce() -> T) -> Result<T, String> {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(init));
    panic::set_hook(hook);
    result.map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

impl<B: Backend> Drop for Context<B> {
    fn drop(&mut self) {
        unsafe {
            self.instance
                .destroy_surface(ManuallyDrop::into_inner(ptr::read(&self.surface)));
        }
    }
}
