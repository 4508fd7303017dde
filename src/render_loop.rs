use crate::frame::{Frame, Scene};
use crate::input::InputState;

/// Where frames go and where input comes from.
pub trait Presenter {
    fn present(&mut self, frame: &Frame);
    fn poll_input(&mut self) -> InputState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopExit {
    pub frames: u64,
    pub reason: InputState,
}

/// Draws frames until the presenter reports an exit request.
///
/// Input is polled after every presented frame, so at least one frame is
/// always drawn and the loop stops on the poll that first reports an exit.
pub fn run<P, S>(presenter: &mut P, scene: &mut S) -> LoopExit
where
    P: Presenter + ?Sized,
    S: Scene,
{
    let mut frames = 0;
    loop {
        let frame = scene.next_frame();
        presenter.present(&frame);
        frames += 1;

        let input = presenter.poll_input();
        if input.should_exit() {
            log::info!("leaving render loop after {} frames: {:?}", frames, input);
            return LoopExit {
                frames,
                reason: input,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{OrbitScene, ProgramSlot, StaticScene};

    struct Recorder {
        frames: Vec<Frame>,
        polls: usize,
        exit_after: usize,
        reason: InputState,
    }

    impl Recorder {
        fn exiting_after(polls: usize, reason: InputState) -> Self {
            Recorder {
                frames: Vec::new(),
                polls: 0,
                exit_after: polls,
                reason,
            }
        }
    }

    impl Presenter for Recorder {
        fn present(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }

        fn poll_input(&mut self) -> InputState {
            self.polls += 1;
            if self.polls >= self.exit_after {
                self.reason
            } else {
                InputState::Continue
            }
        }
    }

    #[test]
    fn escape_stops_on_the_same_iteration() {
        let mut presenter = Recorder::exiting_after(5, InputState::Escape);
        let exit = run(&mut presenter, &mut StaticScene);
        assert_eq!(
            exit,
            LoopExit {
                frames: 5,
                reason: InputState::Escape
            }
        );
        assert_eq!(presenter.frames.len(), 5);
        assert_eq!(presenter.polls, 5);
    }

    #[test]
    fn close_request_stops_the_loop() {
        let mut presenter = Recorder::exiting_after(2, InputState::CloseRequested);
        let exit = run(&mut presenter, &mut OrbitScene::new());
        assert_eq!(exit.reason, InputState::CloseRequested);
        assert_eq!(exit.frames, 2);
    }

    #[test]
    fn a_frame_is_drawn_before_the_first_poll() {
        let mut presenter = Recorder::exiting_after(1, InputState::Escape);
        let exit = run(&mut presenter, &mut StaticScene);
        assert_eq!(exit.frames, 1);
        assert_eq!(presenter.frames.len(), 1);
    }

    #[test]
    fn every_frame_issues_two_draws() {
        let mut presenter = Recorder::exiting_after(4, InputState::Escape);
        run(&mut presenter, &mut OrbitScene::new());
        for frame in &presenter.frames {
            let draws: Vec<_> = frame
                .draws
                .iter()
                .map(|d| (d.program, d.vertices.clone()))
                .collect();
            assert_eq!(
                draws,
                vec![(ProgramSlot::First, 0..3), (ProgramSlot::Second, 3..6)]
            );
        }
    }

    #[test]
    fn orbit_transform_changes_between_frames() {
        let mut presenter = Recorder::exiting_after(3, InputState::Escape);
        run(&mut presenter, &mut OrbitScene::new());
        let mvps: Vec<_> = presenter
            .frames
            .iter()
            .map(|f| f.draws[0].transform.unwrap())
            .collect();
        assert!(!mvps[0].abs_diff_eq(mvps[1], 1e-7));
        assert!(!mvps[1].abs_diff_eq(mvps[2], 1e-7));
    }
}
