//! # Voxel Streamer Entry Point
//!
//! Runs the library's demo flight. See [`voxel_streamer::run`].
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_streamer::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("voxel-streamer: {err}");
            ExitCode::FAILURE
        }
    }
}
