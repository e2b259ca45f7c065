use clap::Parser;

use emotion_bridge::bridge;
use emotion_bridge::cli::{handle_config_action, list_cameras, Args, Command, ConfigAction};
use emotion_bridge::config::{self, Config};
use emotion_bridge::error::StartupError;
use emotion_bridge::logging;
use emotion_bridge::signal;

fn main() {
    let args = Args::parse();
    logging::init_logging(logging::level_for(args.verbose));

    if let Err(e) = run(args) {
        log::debug!("Fatal: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), StartupError> {
    let config_path = args.config.clone().unwrap_or_else(config::default_path);

    // `config init` must work even when the existing file is broken.
    if let Some(Command::Config {
        action: ConfigAction::Init,
    }) = &args.command
    {
        handle_config_action(ConfigAction::Init, &Config::default(), &config_path)?;
        return Ok(());
    }

    let mut config = Config::load(Some(&config_path))?;
    args.apply_to(&mut config);
    config.validate()?;

    match args.command {
        Some(Command::ListCameras) => list_cameras(),
        Some(Command::Config { action }) => {
            handle_config_action(action, &config, &config_path)?;
            Ok(())
        }
        None => {
            signal::install()?;
            let end = bridge::serve(&config)?;
            log::info!("Shutdown complete: {}", end);
            Ok(())
        }
    }
}
