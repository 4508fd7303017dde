use gfx_hal::window::Extent2D;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

/// Result of one input poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Continue,
    Escape,
    CloseRequested,
}

impl InputState {
    pub fn should_exit(self) -> bool {
        self != InputState::Continue
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::Continue
    }
}

/// Collects window events between two polls.
///
/// An exit request is sticky: once seen it is reported even if the key
/// was released again before the poll finished.
#[derive(Debug, Default)]
pub struct InputTracker {
    state: InputState,
    resized: Option<Extent2D>,
}

impl InputTracker {
    pub fn handle(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested(),
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        virtual_keycode,
                        state,
                        ..
                    },
                ..
            } => self.key(*virtual_keycode, *state),
            WindowEvent::Resized(size) => self.resized(*size),
            _ => {}
        }
    }

    pub fn key(&mut self, key: Option<VirtualKeyCode>, state: ElementState) {
        if key == Some(VirtualKeyCode::Escape) && state == ElementState::Pressed {
            self.raise(InputState::Escape);
        }
    }

    pub fn close_requested(&mut self) {
        self.raise(InputState::CloseRequested);
    }

    pub fn resized(&mut self, size: PhysicalSize<u32>) {
        self.resized = Some(Extent2D {
            width: size.width,
            height: size.height,
        });
    }

    /// Returns what was seen since the last call and starts over.
    pub fn take(&mut self) -> (InputState, Option<Extent2D>) {
        let state = std::mem::take(&mut self.state);
        (state, self.resized.take())
    }

    fn raise(&mut self, state: InputState) {
        if self.state == InputState::Continue {
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_poll_continues() {
        let mut tracker = InputTracker::default();
        tracker.key(Some(VirtualKeyCode::Space), ElementState::Pressed);
        tracker.key(Some(VirtualKeyCode::Escape), ElementState::Released);
        tracker.key(None, ElementState::Pressed);
        assert_eq!(tracker.take(), (InputState::Continue, None));
    }

    #[test]
    fn escape_press_is_sticky() {
        let mut tracker = InputTracker::default();
        tracker.key(Some(VirtualKeyCode::Escape), ElementState::Pressed);
        tracker.key(Some(VirtualKeyCode::Escape), ElementState::Released);
        let (state, _) = tracker.take();
        assert_eq!(state, InputState::Escape);
        assert!(state.should_exit());
    }

    #[test]
    fn first_exit_reason_wins() {
        let mut tracker = InputTracker::default();
        tracker.close_requested();
        tracker.key(Some(VirtualKeyCode::Escape), ElementState::Pressed);
        assert_eq!(tracker.take().0, InputState::CloseRequested);
    }

    #[test]
    fn take_resets() {
        let mut tracker = InputTracker::default();
        tracker.close_requested();
        tracker.resized(PhysicalSize::new(800, 600));
        assert_eq!(
            tracker.take(),
            (
                InputState::CloseRequested,
                Some(Extent2D {
                    width: 800,
                    height: 600
                })
            )
        );
        assert_eq!(tracker.take(), (InputState::Continue, None));
    }

    #[test]
    fn close_event_is_recognized() {
        let mut tracker = InputTracker::default();
        tracker.handle(&WindowEvent::CloseRequested);
        assert_eq!(tracker.take().0, InputState::CloseRequested);
    }
}
