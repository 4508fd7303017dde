#[cfg(feature = "metal")]
pub use gfx_backend_metal::Backend as DefaultBackend;

#[cfg(all(feature = "vulkan", not(feature = "metal")))]
pub use gfx_backend_vulkan::Backend as DefaultBackend;

use crate::config::WindowConfig;
use crate::context::Context;
use crate::error::Error;
use crate::frame::{Frame, Scene};
use crate::input::{InputState, InputTracker};
use crate::render_loop::{self, LoopExit, Presenter};
use crate::renderer::{Renderer, RendererConfig};
use crate::shaders::{self, ProgramSource};
use fps_counter::FPSCounter;
use gfx_hal::Backend;
use std::marker::PhantomData;
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::desktop::EventLoopExtDesktop;

/// One of the two homework programs.
#[derive(Debug, Clone)]
pub struct Program {
    pub window: WindowConfig,
    pub sources: &'static [ProgramSource; 2],
    pub uses_transform: bool,
}

impl Program {
    pub fn hw1() -> Self {
        Program {
            window: WindowConfig::hw1(),
            sources: &shaders::HW1,
            uses_transform: false,
        }
    }

    pub fn hw2() -> Self {
        Program {
            window: WindowConfig::hw2(),
            sources: &shaders::HW2,
            uses_transform: true,
        }
    }
}

struct WindowPresenter<'r, 'a, B: Backend> {
    event_loop: &'r mut EventLoop<()>,
    queue: &'r mut B::CommandQueue,
    renderer: Renderer<'a, B>,
    input: InputTracker,
    fps: FPSCounter,
}

impl<'r, 'a, B: Backend> Presenter for WindowPresenter<'r, 'a, B> {
    fn present(&mut self, frame: &Frame) {
        self.renderer.render(self.queue, frame);
        log::trace!("fps: {}", self.fps.tick());
    }

    fn poll_input(&mut self) -> InputState {
        let input = &mut self.input;
        self.event_loop.run_return(|event, _, control_flow| match event {
            Event::WindowEvent { event, .. } => input.handle(&event),
            Event::MainEventsCleared => *control_flow = ControlFlow::Exit,
            _ => {}
        });

        let (state, resized) = self.input.take();
        if let Some(dims) = resized {
            if dims.width > 0 && dims.height > 0 {
                self.renderer.resize(dims);
            }
        }
        state
    }
}

/// The two startup stages of a program: open the window context, then build
/// the presenter that draws into it.
pub trait Launch {
    type Context;

    fn open_context(&mut self) -> Result<Self::Context, Error>;

    fn build_presenter<'c>(
        &mut self,
        context: &'c mut Self::Context,
    ) -> Result<Box<dyn Presenter + 'c>, Error>;
}

/// Runs `scene` through whatever `launcher` opens. The presenter is dropped
/// before the context it borrows from.
pub fn launch<L, S>(launcher: &mut L, scene: &mut S) -> Result<LoopExit, Error>
where
    L: Launch,
    S: Scene,
{
    let mut context = launcher.open_context()?;
    let exit = {
        let mut presenter = launcher.build_presenter(&mut context)?;
        render_loop::run(&mut *presenter, scene)
    };
    Ok(exit)
}

/// Window, device and renderer for one [`Program`] on backend `B`.
pub struct WindowLaunch<'p, B> {
    program: &'p Program,
    backend: PhantomData<B>,
}

impl<'p, B> WindowLaunch<'p, B> {
    pub fn new(program: &'p Program) -> Self {
        WindowLaunch {
            program,
            backend: PhantomData,
        }
    }
}

impl<'p, B: Backend> Launch for WindowLaunch<'p, B> {
    type Context = Context<B>;

    fn open_context(&mut self) -> Result<Context<B>, Error> {
        Context::new(self.program.window.clone())
    }

    fn build_presenter<'c>(
        &mut self,
        context: &'c mut Context<B>,
    ) -> Result<Box<dyn Presenter + 'c>, Error> {
        let config = RendererConfig {
            dims: context.config.extent(),
            samples: context.config.samples,
            programs: self.program.sources,
            uses_transform: self.program.uses_transform,
        };

        let Context {
            event_loop,
            surface,
            adapter,
            device,
            queue_group,
            ..
        } = context;
        let renderer = Renderer::new(&mut **surface, adapter, device, queue_group.family, config)?;
        log::debug!("rendering with {}x multisampling", renderer.samples());

        let queue = queue_group
            .queues
            .first_mut()
            .ok_or_else(|| Error::Adapter("device opened without a queue".into()))?;
        Ok(Box::new(WindowPresenter::<B> {
            event_loop,
            queue,
            renderer,
            input: InputTracker::default(),
            fps: FPSCounter::new(),
        }))
    }
}

/// Opens the window, builds both programs and renders `scene` until the
/// user quits.
pub fn run<B, S>(program: &Program, scene: &mut S) -> Result<LoopExit, Error>
where
    B: Backend,
    S: Scene,
{
    launch(&mut WindowLaunch::<B>::new(program), scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code;
    use crate::frame::StaticScene;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct FakeContext(Log);

    impl Drop for FakeContext {
        fn drop(&mut self) {
            self.0.borrow_mut().push("context dropped");
        }
    }

    struct FakePresenter {
        log: Log,
        polls: usize,
    }

    impl Presenter for FakePresenter {
        fn present(&mut self, _frame: &Frame) {
            self.log.borrow_mut().push("present");
        }

        fn poll_input(&mut self) -> InputState {
            self.polls += 1;
            if self.polls == 2 {
                InputState::Escape
            } else {
                InputState::Continue
            }
        }
    }

    impl Drop for FakePresenter {
        fn drop(&mut self) {
            self.log.borrow_mut().push("presenter dropped");
        }
    }

    struct FakeLaunch {
        log: Log,
        context_fails: bool,
    }

    impl Launch for FakeLaunch {
        type Context = FakeContext;

        fn open_context(&mut self) -> Result<FakeContext, Error> {
            if self.context_fails {
                return Err(Error::Subsystem("no display".into()));
            }
            self.log.borrow_mut().push("context opened");
            Ok(FakeContext(self.log.clone()))
        }

        fn build_presenter<'c>(
            &mut self,
            _context: &'c mut FakeContext,
        ) -> Result<Box<dyn Presenter + 'c>, Error> {
            self.log.borrow_mut().push("presenter built");
            Ok(Box::new(FakePresenter {
                log: self.log.clone(),
                polls: 0,
            }))
        }
    }

    #[test]
    fn failed_context_never_builds_a_presenter() {
        let log = Log::default();
        let mut launcher = FakeLaunch {
            log: log.clone(),
            context_fails: true,
        };
        let result = launch(&mut launcher, &mut StaticScene);
        assert!(matches!(result, Err(Error::Subsystem(_))));
        assert_eq!(exit_code(&result), -1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn presenter_is_dropped_once_before_the_context() {
        let log = Log::default();
        let mut launcher = FakeLaunch {
            log: log.clone(),
            context_fails: false,
        };
        let exit = launch(&mut launcher, &mut StaticScene).unwrap();
        assert_eq!(exit.frames, 2);
        assert_eq!(exit.reason, InputState::Escape);
        assert_eq!(
            *log.borrow(),
            vec![
                "context opened",
                "presenter built",
                "present",
                "present",
                "presenter dropped",
                "context dropped",
            ]
        );
    }

    #[test]
    fn only_the_camera_program_uploads_a_transform() {
        let (hw1, hw2) = (Program::hw1(), Program::hw2());
        assert!(!hw1.uses_transform);
        assert!(hw2.uses_transform);
        assert_eq!(hw1.window.title, "HW1");
        assert_eq!(hw2.window.title, "HW2");
    }

    #[test]
    fn programs_pick_their_own_shader_directory() {
        assert_eq!(Program::hw1().sources[0].vertex.spirv, shaders::HW1[0].vertex.spirv);
        assert_eq!(Program::hw2().sources[1].fragment.spirv, shaders::HW2[1].fragment.spirv);
    }
}
