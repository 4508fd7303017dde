use anyhow::Context as _;
use gfx_homework::app::{self, DefaultBackend, Program};
use gfx_homework::frame::OrbitScene;
use gfx_homework::{exit_code, logging};

fn main() {
    logging::init();

    let mut scene = OrbitScene::new();
    let result = app::run::<DefaultBackend, _>(&Program::hw2(), &mut scene);
    let code = exit_code(&result);
    let result = result.context("HW2 could not start");
    match result {
        Ok(exit) => {
            log::info!(
                "{} frames drawn, camera stopped at {:.4} rad",
                exit.frames,
                scene.camera().angle()
            );
            println!("The end.");
        }
        Err(err) => {
            log::error!("{:#}", err);
            std::process::exit(code);
        }
    }
}
