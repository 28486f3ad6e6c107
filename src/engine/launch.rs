use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::engine::models::{
    Account, ClientConfig, CloseBehavior, Instance, LaunchJava, LaunchLoader, LaunchMemory,
    LaunchRequest,
};
use crate::engine::state::{HomeUpdate, InfoText, Popup, PopupKind};
use crate::util::{format_estimated, format_speed, progress_percent};

const LAUNCH_TIMEOUT_MS: u64 = 10_000;

/// Lifecycle events emitted by the external launcher over one launch.
///
/// On the wire every event is one JSON object per line:
/// `{"event":"progress","data":{"current":10,"total":200}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum LaunchEvent {
    Extract(String),
    Progress { current: u64, total: u64 },
    Check { current: u64, total: u64 },
    /// Remaining seconds.
    Estimated(f64),
    /// Bytes per second.
    Speed(f64),
    Patch(String),
    /// The game process is up; its first occurrence starts the game view.
    Data(String),
    /// Launcher or game output that is not a lifecycle event.
    Output(String),
    Close(Option<i32>),
    Error(Option<String>),
}

impl LaunchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchEvent::Close(_) | LaunchEvent::Error(_))
    }
}

/// Fire-and-forget messages for the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowSignal {
    Show,
    Hide,
    ProgressLoad,
    Progress { current: u64, total: u64 },
    ProgressReset,
}

/// UI side effects of a single launcher event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    pub updates: Vec<HomeUpdate>,
    pub signals: Vec<WindowSignal>,
}

/// Map one launcher event to UI updates and window signals.
///
/// `first_data` tells whether this is the first `Data` event of the session, so
/// the window is hidden only once.
pub fn project(event: &LaunchEvent, close_behavior: CloseBehavior, first_data: bool) -> Projection {
    let mut out = Projection::default();
    match event {
        LaunchEvent::Extract(file) => {
            debug!("launch: extract {file}");
            out.signals.push(WindowSignal::ProgressLoad);
        }
        LaunchEvent::Progress { current, total } => {
            out.updates.push(HomeUpdate::Info(InfoText::Downloading(
                progress_percent(*current, *total),
            )));
            push_progress(&mut out, *current, *total);
        }
        LaunchEvent::Check { current, total } => {
            out.updates.push(HomeUpdate::Info(InfoText::Checking(progress_percent(
                *current, *total,
            ))));
            push_progress(&mut out, *current, *total);
        }
        LaunchEvent::Estimated(seconds) => {
            let text = format_estimated(*seconds);
            debug!("launch: estimated {text}");
            out.updates.push(HomeUpdate::Estimated(text));
        }
        LaunchEvent::Speed(bytes_per_sec) => {
            let text = format_speed(*bytes_per_sec);
            debug!("launch: speed {text}");
            out.updates.push(HomeUpdate::Speed(text));
        }
        LaunchEvent::Patch(detail) => {
            debug!("launch: patch {detail}");
            out.signals.push(WindowSignal::ProgressLoad);
            out.updates.push(HomeUpdate::Info(InfoText::Patching));
        }
        LaunchEvent::Data(line) => {
            info!(target: "game", "{line}");
            if first_data {
                out.updates.push(HomeUpdate::ProgressHidden);
                if close_behavior.hides_window() {
                    out.signals.push(WindowSignal::Hide);
                }
                out.signals.push(WindowSignal::ProgressLoad);
                out.updates.push(HomeUpdate::Info(InfoText::Starting));
            }
        }
        LaunchEvent::Output(line) => info!(target: "game", "{line}"),
        LaunchEvent::Close(code) => {
            info!("launch: game closed (code {code:?})");
            push_reset(&mut out, close_behavior);
        }
        LaunchEvent::Error(message) => {
            warn!("launch: launcher reported an error: {message:?}");
            let message = message.clone().filter(|m| !m.trim().is_empty());
            out.updates
                .push(HomeUpdate::Popup(Popup::new(PopupKind::LaunchFailed(message))));
            push_reset(&mut out, close_behavior);
        }
    }
    out
}

fn push_progress(out: &mut Projection, current: u64, total: u64) {
    out.updates.push(HomeUpdate::Progress { current, total });
    out.signals.push(WindowSignal::Progress { current, total });
}

fn push_reset(out: &mut Projection, close_behavior: CloseBehavior) {
    if close_behavior.hides_window() {
        out.signals.push(WindowSignal::Show);
    }
    out.signals.push(WindowSignal::ProgressReset);
    out.updates.push(HomeUpdate::ProgressHidden);
    out.updates.push(HomeUpdate::Info(InfoText::Ready));
}

/// Combine client settings, the resolved account and the resolved instance.
pub fn build_launch_request(
    config: &ClientConfig,
    account: &Account,
    instance: &Instance,
    game_root: &Path,
) -> LaunchRequest {
    let memory = config.java_config.java_memory;
    if let Some(total_gib) = system_memory_gib()
        && memory.max > total_gib
    {
        warn!(
            "launch: configured max memory {:.1} GiB exceeds physical memory {:.1} GiB",
            memory.max, total_gib
        );
    }

    let loader_type = instance.loadder.loadder_type.clone();
    let enable = !matches!(loader_type.as_str(), "" | "none");
    let behavior = config.launcher_config.close_launcher;

    LaunchRequest {
        url: instance.url.clone(),
        authenticator: account.clone(),
        timeout: LAUNCH_TIMEOUT_MS,
        path: game_root.to_path_buf(),
        instance: instance.name.clone(),
        version: instance.loadder.minecraft_version.clone(),
        detached: behavior.detached(),
        download_file_multiple: config.launcher_config.download_multi,
        intel_enabled_mac: config.launcher_config.intel_enabled_mac,
        loader: LaunchLoader {
            loader_type,
            build: instance.loadder.loadder_version.clone(),
            enable,
        },
        verify: instance.verify,
        ignored: instance.ignored.clone(),
        java: LaunchJava {
            path: config.java_config.java_path.clone(),
        },
        jvm_args: instance.jvm_args.clone(),
        game_args: instance.game_args.clone(),
        screen: config.game_config.screen_size,
        memory: LaunchMemory {
            min: memory.min_arg(),
            max: memory.max_arg(),
        },
    }
}

fn system_memory_gib() -> Option<f64> {
    let mut system = System::new();
    system.refresh_memory();
    let total = system.total_memory();
    (total > 0).then(|| total as f64 / (1024.0 * 1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::{LoaderSpec, MemoryBounds};

    fn instance() -> Instance {
        Instance {
            name: "main".into(),
            url: "https://example.org/files/main".into(),
            loadder: LoaderSpec {
                minecraft_version: "1.20.1".into(),
                loadder_type: "forge".into(),
                loadder_version: "47.2.0".into(),
            },
            verify: true,
            ignored: vec!["logs".into()],
            jvm_args: vec!["-XX:+UseG1GC".into()],
            ..Instance::default()
        }
    }

    #[test]
    fn builds_request_from_config_and_instance() {
        let mut config = ClientConfig::default();
        config.java_config.java_memory = MemoryBounds { min: 1.0, max: 3.0 };
        config.launcher_config.close_launcher = CloseBehavior::CloseAll;
        let account = Account::offline("Steve");
        let request = build_launch_request(&config, &account, &instance(), Path::new("/games/.mc"));

        assert_eq!(request.instance, "main");
        assert_eq!(request.version, "1.20.1");
        assert_eq!(request.timeout, 10_000);
        assert!(!request.detached);
        assert!(request.loader.enable);
        assert_eq!(request.loader.build, "47.2.0");
        assert_eq!(request.memory.min, "1024M");
        assert_eq!(request.memory.max, "3072M");
        assert_eq!(request.jvm_args, vec!["-XX:+UseG1GC"]);
        assert!(request.game_args.is_empty());
        assert_eq!(request.authenticator, account);
    }

    #[test]
    fn vanilla_loader_is_disabled() {
        let mut vanilla = instance();
        vanilla.loadder.loadder_type = "none".into();
        let request = build_launch_request(
            &ClientConfig::default(),
            &Account::offline("Steve"),
            &vanilla,
            Path::new("/tmp"),
        );
        assert!(!request.loader.enable);
        assert!(request.detached);
    }

    #[test]
    fn request_uses_launcher_field_names() {
        let request = build_launch_request(
            &ClientConfig::default(),
            &Account::offline("Steve"),
            &instance(),
            Path::new("/tmp"),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("JVM_ARGS").is_some());
        assert!(json.get("GAME_ARGS").is_some());
        assert!(json.get("downloadFileMultiple").is_some());
        assert_eq!(json["loader"]["type"], "forge");
    }

    #[test]
    fn progress_updates_text_bar_and_taskbar() {
        let out = project(
            &LaunchEvent::Progress {
                current: 25,
                total: 100,
            },
            CloseBehavior::CloseLauncher,
            false,
        );
        assert_eq!(
            out.updates,
            vec![
                HomeUpdate::Info(InfoText::Downloading(25)),
                HomeUpdate::Progress {
                    current: 25,
                    total: 100
                },
            ]
        );
        assert_eq!(
            out.signals,
            vec![WindowSignal::Progress {
                current: 25,
                total: 100
            }]
        );
    }

    #[test]
    fn first_data_hides_window_only_with_close_launcher() {
        let hidden = project(&LaunchEvent::Data("ok".into()), CloseBehavior::CloseLauncher, true);
        assert!(hidden.signals.contains(&WindowSignal::Hide));
        assert!(hidden.updates.contains(&HomeUpdate::Info(InfoText::Starting)));

        let kept = project(&LaunchEvent::Data("ok".into()), CloseBehavior::KeepOpen, true);
        assert!(!kept.signals.contains(&WindowSignal::Hide));

        let later = project(&LaunchEvent::Data("ok".into()), CloseBehavior::CloseLauncher, false);
        assert_eq!(later, Projection::default());
    }

    #[test]
    fn plain_output_leaves_the_view_alone() {
        let out = project(
            &LaunchEvent::Output("npm WARN deprecated".into()),
            CloseBehavior::CloseLauncher,
            false,
        );
        assert_eq!(out, Projection::default());
        assert!(!LaunchEvent::Output(String::new()).is_terminal());
    }

    #[test]
    fn close_resets_ui_and_shows_window() {
        let out = project(&LaunchEvent::Close(Some(0)), CloseBehavior::CloseLauncher, false);
        assert_eq!(
            out.signals,
            vec![WindowSignal::Show, WindowSignal::ProgressReset]
        );
        assert!(out.updates.contains(&HomeUpdate::Info(InfoText::Ready)));

        let out = project(&LaunchEvent::Close(None), CloseBehavior::CloseAll, false);
        assert_eq!(out.signals, vec![WindowSignal::ProgressReset]);
    }

    #[test]
    fn error_without_message_uses_generic_popup() {
        let out = project(&LaunchEvent::Error(None), CloseBehavior::KeepOpen, false);
        assert!(out
            .updates
            .contains(&HomeUpdate::Popup(Popup::new(PopupKind::LaunchFailed(None)))));
        assert!(out.updates.contains(&HomeUpdate::Info(InfoText::Ready)));

        let out = project(
            &LaunchEvent::Error(Some("java not found".into())),
            CloseBehavior::KeepOpen,
            false,
        );
        assert!(out.updates.contains(&HomeUpdate::Popup(Popup::new(
            PopupKind::LaunchFailed(Some("java not found".into()))
        ))));
    }

    #[test]
    fn parses_wire_events() {
        let event: LaunchEvent =
            serde_json::from_str(r#"{"event":"check","data":{"current":3,"total":4}}"#).unwrap();
        assert_eq!(event, LaunchEvent::Check { current: 3, total: 4 });
        let event: LaunchEvent = serde_json::from_str(r#"{"event":"close","data":1}"#).unwrap();
        assert_eq!(event, LaunchEvent::Close(Some(1)));
        assert!(event.is_terminal());
    }
}
