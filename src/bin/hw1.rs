use anyhow::Context as _;
use gfx_homework::app::{self, DefaultBackend, Program};
use gfx_homework::frame::StaticScene;
use gfx_homework::{exit_code, logging};

fn main() {
    logging::init();

    let result = app::run::<DefaultBackend, _>(&Program::hw1(), &mut StaticScene);
    let code = exit_code(&result);
    let result = result.context("HW1 could not start");
    match result {
        Ok(exit) => {
            log::info!("{} frames drawn", exit.frames);
            println!("End of the program");
        }
        Err(err) => {
            log::error!("{:#}", err);
            std::process::exit(code);
        }
    }
}
