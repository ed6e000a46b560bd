use clap::Parser;
use xtmf_calibration::app::{self, CalibrationAppArguments};

fn main() {
    env_logger::init();
    log::info!("starting app at {}", chrono::Local::now().to_rfc3339());
    let args = CalibrationAppArguments::parse();
    if let Err(e) = app::run(&args.app) {
        log::error!("calibration failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
