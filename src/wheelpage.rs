use std::path::PathBuf;
use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use crate::config::Config;
use crate::gesture::ZoomModifier;
use crate::scanner::SortOrder;

mod config;
mod gesture;
mod gui;
mod scanner;
mod session;
mod state;
mod store;
mod viewport;

#[derive(Parser, Debug)]
#[command(author, version, about = "Reads a directory of images page by page with the mouse wheel.", long_about = None)]
struct Cli {
    /// Directory to open on startup
    dir: Option<PathBuf>,

    /// Page order (overrides the config file)
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// Modifier that turns the wheel into zoom (overrides the config file)
    #[arg(long, value_enum)]
    zoom_modifier: Option<ZoomModifier>,

    /// Config file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref dir) = self.dir {
            if !dir.exists() {
                return Err(format!("Directory does not exist: {:?}", dir));
            }
            if !dir.is_dir() {
                return Err(format!("Not a directory: {:?}", dir));
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        error!("{:#}", e);
        std::process::exit(1);
    }
    if let Some(sort) = args.sort {
        config.browse.sort = sort;
    }
    if let Some(modifier) = args.zoom_modifier {
        config.input.zoom_modifier = modifier;
    }
    debug!("{:?}", config);

    let app = gui::GuiApp::new(config, args.dir);
    if let Err(e) = app.run() {
        error!("GUI Error: {}", e);
        anyhow::bail!("GUI exited with an error");
    }
    Ok(())
}
