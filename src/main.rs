use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::error;

mod config;
mod engine;
mod env;
mod headless;
mod host;
mod networking;
mod process;
mod storage;
mod ui;
mod util;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "Home Launcher",
    author,
    version,
    about = "Game launcher home screen with news, instance selection and play"
)]
struct Cli {
    /// Print launcher version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,

    /// Read launcher settings from this file instead of the app directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the base URL serving news and instances.
    #[arg(long)]
    remote_url: Option<String>,

    /// Override the game data directory name.
    #[arg(long)]
    data_dir: Option<String>,

    /// Override the external launcher command line.
    #[arg(long)]
    launcher_cmd: Option<String>,

    /// Initialize and launch from the terminal without opening a window.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        let path = self.config.clone().unwrap_or_else(AppConfig::default_path);
        let mut config = AppConfig::load(&path);
        if let Some(url) = &self.remote_url {
            config.remote_url.clone_from(url);
        }
        if let Some(dir) = &self.data_dir {
            config.data_directory.clone_from(dir);
        }
        if let Some(cmd) = &self.launcher_cmd {
            config.launcher_command.clone_from(cmd);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Home Launcher {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let config = cli.app_config();
    if cli.headless {
        return headless::run(config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(ui::APP_TITLE)
            .with_icon(default_icon())
            .with_inner_size(eframe::egui::vec2(1080.0, 680.0)),
        ..Default::default()
    };
    let result = eframe::run_native(
        ui::APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(ui::LauncherApp::new(cc, config)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("ui: {err}");
            ExitCode::FAILURE
        }
    }
}

fn default_icon() -> eframe::egui::IconData {
    // 2x2: dark background with a teal accent.
    let rgba: Vec<u8> = vec![
        20, 24, 32, 255, 30, 196, 170, 255, //
        20, 24, 32, 255, 20, 150, 130, 255,
    ];
    eframe::egui::IconData {
        rgba,
        width: 2,
        height: 2,
    }
}
