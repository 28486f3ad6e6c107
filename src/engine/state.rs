use crate::engine::launch::LaunchEvent;
use crate::engine::models::{ClientConfig, InstanceStatus};
use crate::engine::news::NewsFeed;

// Readiness of the play button; the single source of truth for launch gating.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LaunchPhase {
    #[default]
    Idle,
    VerifyingAccount,
    VerifyingInstance,
    Launching,
    Running,
    Errored(String),
}

impl LaunchPhase {
    /// A launch is in flight and a new one must be rejected.
    pub fn is_busy(&self) -> bool {
        !matches!(self, LaunchPhase::Idle | LaunchPhase::Errored(_))
    }

    /// Phase after the external launcher reported `event`.
    pub fn after_event(&self, event: &LaunchEvent) -> LaunchPhase {
        match event {
            LaunchEvent::Close(_) => LaunchPhase::Idle,
            LaunchEvent::Error(message) => LaunchPhase::Errored(
                message
                    .clone()
                    .unwrap_or_else(|| "launch failed".to_owned()),
            ),
            LaunchEvent::Data(_) => LaunchPhase::Running,
            LaunchEvent::Output(_) => self.clone(),
            _ => match self {
                LaunchPhase::Running => LaunchPhase::Running,
                _ => LaunchPhase::Launching,
            },
        }
    }
}

/// Screens reachable from the home panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Home,
    Settings,
    Login,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PopupKind {
    /// No stored account matches the selection; offers login or offline mode.
    LoginRequired,
    NoInstance,
    AlreadyRunning,
    /// Launcher-reported failure; `None` shows the generic copy.
    LaunchFailed(Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popup {
    pub kind: PopupKind,
    pub dismissible: bool,
}

impl Popup {
    pub fn new(kind: PopupKind) -> Self {
        let dismissible = !matches!(kind, PopupKind::LoginRequired);
        Self { kind, dismissible }
    }
}

/// Text shown under the play button while a launch is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InfoText {
    Connecting,
    Verifying,
    Downloading(u8),
    Checking(u8),
    Patching,
    Starting,
    #[default]
    Ready,
}

/// Entry of the instance picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceEntry {
    pub name: String,
    pub active: bool,
}

/// Everything the home view-model publishes to its renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum HomeUpdate {
    Phase(LaunchPhase),
    Info(InfoText),
    Progress { current: u64, total: u64 },
    ProgressHidden,
    News(NewsFeed),
    Instances { selected: Option<String>, count: usize },
    InstanceMenu(Vec<InstanceEntry>),
    InstanceMenuClosed,
    Status(InstanceStatus),
    Popup(Popup),
    ChangePanel(Panel),
    Estimated(String),
    Speed(String),
    Config(ClientConfig),
}

// Actions triggered by the user from the UI layer.
#[derive(Clone, Debug)]
pub enum UserAction {
    ClickPlay,
    OpenInstanceMenu,
    CloseInstanceMenu,
    SelectInstance(String),
    OpenSettings,
    OpenSocial(String),
    PopupChoice(Panel),
    AddOfflineAccount(String),
    SaveConfig(ClientConfig),
    RefreshNews,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_and_errored_accept_launches() {
        assert!(!LaunchPhase::Idle.is_busy());
        assert!(!LaunchPhase::Errored("boom".into()).is_busy());
        assert!(LaunchPhase::VerifyingAccount.is_busy());
        assert!(LaunchPhase::VerifyingInstance.is_busy());
        assert!(LaunchPhase::Launching.is_busy());
        assert!(LaunchPhase::Running.is_busy());
    }

    #[test]
    fn lifecycle_events_move_the_phase() {
        let phase = LaunchPhase::Launching;
        let phase = phase.after_event(&LaunchEvent::Progress {
            current: 1,
            total: 2,
        });
        assert_eq!(phase, LaunchPhase::Launching);
        let phase = phase.after_event(&LaunchEvent::Output("npm WARN deprecated".into()));
        assert_eq!(phase, LaunchPhase::Launching);
        let phase = phase.after_event(&LaunchEvent::Data("[main] hello".into()));
        assert_eq!(phase, LaunchPhase::Running);
        let phase = phase.after_event(&LaunchEvent::Speed(10.0));
        assert_eq!(phase, LaunchPhase::Running);
        assert_eq!(phase.after_event(&LaunchEvent::Close(Some(0))), LaunchPhase::Idle);
        assert_eq!(
            phase.after_event(&LaunchEvent::Error(None)),
            LaunchPhase::Errored("launch failed".into())
        );
    }

    #[test]
    fn login_popup_is_not_dismissible() {
        assert!(!Popup::new(PopupKind::LoginRequired).dismissible);
        assert!(Popup::new(PopupKind::LaunchFailed(None)).dismissible);
    }
}
