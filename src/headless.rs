use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::engine::state::{HomeUpdate, InfoText, LaunchPhase};
use crate::engine::{HomeController, LaunchOutcome};
use crate::host::NoopHost;
use crate::networking::NetworkClient;
use crate::storage::StorageManager;
use crate::ui::i18n::{I18n, detect_system_language, parse_locale_token};
use crate::util::build_runtime;

const BAR_TEMPLATE: &str = "{spinner} {msg} [{bar:40}] {percent}%";
const SPINNER_TEMPLATE: &str = "{spinner} {msg}";

/// Run initialization and a single launch in the terminal.
pub fn run(config: AppConfig) -> ExitCode {
    let runtime = build_runtime();
    runtime.block_on(run_launch(config))
}

async fn run_launch(config: AppConfig) -> ExitCode {
    let language = config
        .language
        .as_deref()
        .and_then(parse_locale_token)
        .unwrap_or_else(detect_system_language);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = HomeController::new(
        Arc::new(StorageManager::new()),
        Arc::new(NetworkClient::new(&config.remote_url)),
        Arc::new(config.launcher()),
        Arc::new(NoopHost),
        config.game_root(),
        tx,
    );
    let mut progress = TerminalProgress::new(ProgressBar::new_spinner(), I18n::new(language));
    progress.bar.enable_steady_tick(Duration::from_millis(120));

    controller.load_content().await;
    progress.drain(&mut rx);

    match controller.start_game().await {
        LaunchOutcome::Started(mut handle) => loop {
            tokio::select! {
                Some(update) = rx.recv() => progress.apply(update),
                joined = &mut handle => {
                    if let Err(err) = joined {
                        error!("headless: launch session aborted: {err}");
                    }
                    break;
                }
            }
        },
        LaunchOutcome::Failed(err) => {
            progress.drain(&mut rx);
            progress.bar.finish_and_clear();
            error!("headless: launch failed: {err}");
            return ExitCode::FAILURE;
        }
        outcome => {
            progress.drain(&mut rx);
            progress.bar.finish_and_clear();
            error!("headless: launch not started ({outcome:?})");
            return ExitCode::FAILURE;
        }
    }

    progress.drain(&mut rx);
    progress.bar.finish_and_clear();
    match controller.phase().await {
        LaunchPhase::Errored(message) => {
            error!("headless: {message}");
            ExitCode::FAILURE
        }
        _ => {
            info!("headless: game session finished");
            ExitCode::SUCCESS
        }
    }
}

/// Terminal rendering of the home updates.
struct TerminalProgress {
    bar: ProgressBar,
    i18n: I18n,
    info: InfoText,
    speed: Option<String>,
    estimated: Option<String>,
    determinate: bool,
}

impl TerminalProgress {
    fn new(bar: ProgressBar, i18n: I18n) -> Self {
        bar.set_style(spinner_style());
        Self {
            bar,
            i18n,
            info: InfoText::Connecting,
            speed: None,
            estimated: None,
            determinate: false,
        }
    }

    fn drain(&mut self, rx: &mut mpsc::UnboundedReceiver<HomeUpdate>) {
        while let Ok(update) = rx.try_recv() {
            self.apply(update);
        }
    }

    fn apply(&mut self, update: HomeUpdate) {
        match update {
            HomeUpdate::Info(info) => self.info = info,
            HomeUpdate::Progress { current, total } if total > 0 => {
                if !self.determinate {
                    self.bar.set_style(bar_style());
                    self.determinate = true;
                }
                self.bar.set_length(total);
                self.bar.set_position(current.min(total));
            }
            HomeUpdate::ProgressHidden => {
                self.bar.set_style(spinner_style());
                self.determinate = false;
                self.speed = None;
                self.estimated = None;
            }
            HomeUpdate::Speed(speed) => self.speed = Some(speed),
            HomeUpdate::Estimated(estimated) => self.estimated = Some(estimated),
            HomeUpdate::News(feed) => {
                for card in feed.articles() {
                    self.bar.println(format!("* {}", card.title));
                }
            }
            HomeUpdate::Status(status) => self.bar.println(self.i18n.server_status(
                &status.name_server,
                &status.ip,
                status.port,
            )),
            HomeUpdate::Popup(popup) => self.bar.println(format!(
                "{}: {}",
                self.i18n.popup_title(&popup.kind),
                self.i18n.popup_body(&popup.kind)
            )),
            _ => {}
        }
        self.bar.set_message(self.message());
    }

    fn message(&self) -> String {
        let mut parts = vec![self.i18n.info(self.info)];
        if let Some(speed) = &self.speed {
            parts.push(speed.clone());
        }
        if let Some(estimated) = &self.estimated {
            parts.push(self.i18n.estimated(estimated));
        }
        parts.join(" · ")
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::i18n::Language;

    fn progress() -> TerminalProgress {
        TerminalProgress::new(ProgressBar::hidden(), I18n::new(Language::English))
    }

    #[test]
    fn progress_updates_drive_the_bar() {
        let mut p = progress();
        p.apply(HomeUpdate::Info(InfoText::Downloading(25)));
        p.apply(HomeUpdate::Progress {
            current: 25,
            total: 100,
        });
        p.apply(HomeUpdate::Speed("2.0 MB/s".into()));
        assert_eq!(p.bar.length(), Some(100));
        assert_eq!(p.bar.position(), 25);
        assert_eq!(p.message(), "Downloading 25% · 2.0 MB/s");
    }

    #[test]
    fn hiding_progress_clears_transfer_details() {
        let mut p = progress();
        p.apply(HomeUpdate::Progress {
            current: 1,
            total: 2,
        });
        p.apply(HomeUpdate::Estimated("0h 0m 5s".into()));
        p.apply(HomeUpdate::ProgressHidden);
        p.apply(HomeUpdate::Info(InfoText::Ready));
        assert!(!p.determinate);
        assert_eq!(p.message(), "Ready");
    }

    #[test]
    fn indeterminate_progress_keeps_spinner() {
        let mut p = progress();
        p.apply(HomeUpdate::Progress {
            current: 0,
            total: 0,
        });
        assert!(!p.determinate);
    }
}
