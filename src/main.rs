mod app;
mod config;
mod debug;
mod ecs;
mod geom;
mod occlusion;
mod platform;
mod roach;
mod shutdown;
mod swarm;

use clap::Parser;

fn main() {
    env_logger::init();
    log::info!("RoachToy starting up");

    let cli = config::Cli::parse();
    if let Err(e) = app::run(cli) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
