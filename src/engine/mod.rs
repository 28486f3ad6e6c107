use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::engine::launch::{LaunchEvent, WindowSignal, build_launch_request, project};
use crate::engine::models::{Account, ClientConfig, CloseBehavior, Instance};
use crate::engine::news::NewsFeed;
use crate::engine::selection::{
    ensure_account_selected, ensure_instance_selected, find_instance, visible_instances,
};
use crate::engine::state::{
    HomeUpdate, InfoText, InstanceEntry, LaunchPhase, Panel, Popup, PopupKind, UserAction,
};
use crate::host::HostBridge;
use crate::networking::RemoteConfig;
use crate::process::{GameLauncher, LaunchSession};
use crate::storage::Store;

pub mod launch;
pub mod models;
pub mod news;
pub mod selection;
pub mod state;
#[cfg(test)]
pub mod testing;

/// Result of a play request.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The launcher accepted the request; the handle completes when the game closes or fails.
    Started(JoinHandle<()>),
    AlreadyRunning,
    NeedsLogin,
    NoInstance,
    Failed(String),
}

/// View-model of the home screen.
///
/// Owns the launch readiness state and the persisted selections, and publishes
/// every visible change as a [`HomeUpdate`]. Rendering lives elsewhere.
pub struct HomeController<S, R, L, H> {
    store: Arc<S>,
    remote: Arc<R>,
    launcher: Arc<L>,
    host: Arc<H>,
    game_root: PathBuf,
    phase: Arc<Mutex<LaunchPhase>>,
    updates: mpsc::UnboundedSender<HomeUpdate>,
}

impl<S, R, L, H> HomeController<S, R, L, H>
where
    S: Store,
    R: RemoteConfig,
    L: GameLauncher,
    H: HostBridge,
{
    pub fn new(
        store: Arc<S>,
        remote: Arc<R>,
        launcher: Arc<L>,
        host: Arc<H>,
        game_root: PathBuf,
        updates: mpsc::UnboundedSender<HomeUpdate>,
    ) -> Self {
        Self {
            store,
            remote,
            launcher,
            host,
            game_root,
            phase: Arc::new(Mutex::new(LaunchPhase::Idle)),
            updates,
        }
    }

    pub async fn phase(&self) -> LaunchPhase {
        self.phase.lock().await.clone()
    }

    /// Load the news feed while the persisted selections are repaired.
    pub async fn load_content(&self) {
        info!("home: loading content");
        // Both selection steps rewrite the same config record, so they run in sequence.
        let selections = async {
            let instance = self.init_instance_selection().await;
            let account = self.init_account_selection().await;
            (instance, account)
        };
        let (_, (instance, account)) = futures_util::join!(self.refresh_news(), selections);
        debug!(
            "home: content loaded (instance={:?}, account={:?})",
            instance.map(|i| i.name),
            account.map(|a| a.id)
        );
        self.publish(HomeUpdate::Info(InfoText::Ready));
    }

    pub async fn refresh_news(&self) -> NewsFeed {
        let feed = NewsFeed::from_result(self.remote.news().await);
        self.publish(HomeUpdate::News(feed.clone()));
        feed
    }

    pub async fn init_account_selection(&self) -> Option<Account> {
        match ensure_account_selected(&*self.store).await {
            Ok(account) => account,
            Err(err) => {
                error!("home: error initializing account selection: {err}");
                None
            }
        }
    }

    pub async fn init_instance_selection(&self) -> Option<Instance> {
        let instances = match self.remote.instance_list().await {
            Ok(instances) => instances,
            Err(err) => {
                error!("home: error initializing instances: {err}");
                return None;
            }
        };
        let selected = match ensure_instance_selected(&*self.store, &instances).await {
            Ok(selected) => selected,
            Err(err) => {
                error!("home: error initializing instances: {err}");
                return None;
            }
        };
        self.publish(HomeUpdate::Instances {
            selected: selected.as_ref().map(|i| i.name.clone()),
            count: instances.len(),
        });
        match &selected {
            Some(instance) => self.publish(HomeUpdate::Status(instance.status.clone())),
            None => warn!("home: could not find a valid instance to select"),
        }
        selected
    }

    /// Instances the selected account may pick, published as the picker content.
    pub async fn open_instance_menu(&self) -> Result<Vec<InstanceEntry>, String> {
        let config = self.store.read_config().await?;
        let account = match config.account_selected.as_deref() {
            Some(id) => self.store.read_account(id).await?,
            None => None,
        };
        let instances = self.remote.instance_list().await?;
        let entries = visible_instances(
            &instances,
            account.as_ref(),
            config.instance_selct.as_deref(),
        );
        self.publish(HomeUpdate::InstanceMenu(entries.clone()));
        Ok(entries)
    }

    pub async fn select_instance(&self, name: &str) -> Result<Instance, String> {
        let mut config = self.store.read_config().await?;
        let instances = self.remote.instance_list().await?;
        let Some(instance) = find_instance(&instances, Some(name)).cloned() else {
            warn!("home: ignoring selection of unknown instance {name}");
            return Err(format!("unknown instance {name}"));
        };
        if config.instance_selct.as_deref() != Some(name) {
            config.instance_selct = Some(name.to_owned());
            self.store.update_config(&config).await?;
            info!("home: instance {name} selected");
        }
        self.publish(HomeUpdate::InstanceMenuClosed);
        self.publish(HomeUpdate::Instances {
            selected: Some(instance.name.clone()),
            count: instances.len(),
        });
        self.publish(HomeUpdate::Status(instance.status.clone()));
        Ok(instance)
    }

    /// Store an offline account and make it the selected one.
    pub async fn add_offline_account(&self, name: &str) -> Result<Account, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("player name cannot be empty".into());
        }
        if name.contains(char::is_whitespace) {
            return Err("player name cannot contain spaces".into());
        }
        let account = Account::offline(name);
        self.store.update_account(&account).await?;
        let mut config = self.store.read_config().await?;
        config.account_selected = Some(account.id.clone());
        self.store.update_config(&config).await?;
        info!("home: offline account {} added", account.name);
        self.publish(HomeUpdate::ChangePanel(Panel::Home));
        Ok(account)
    }

    pub async fn load_config(&self) -> Result<ClientConfig, String> {
        let config = self.store.read_config().await?;
        self.publish(HomeUpdate::Config(config.clone()));
        Ok(config)
    }

    /// Persist edited settings, keeping the current selections.
    pub async fn save_config(&self, edited: ClientConfig) -> Result<(), String> {
        let mut config = self.store.read_config().await?;
        config.java_config = edited.java_config;
        config.game_config = edited.game_config;
        config.launcher_config = edited.launcher_config;
        self.store.update_config(&config).await?;
        self.publish(HomeUpdate::Config(config));
        Ok(())
    }

    /// Validate the selections and hand the launch over to the external launcher.
    pub async fn start_game(&self) -> LaunchOutcome {
        if !self.try_begin_launch().await {
            warn!("play: launch already in progress");
            self.publish(HomeUpdate::Popup(Popup::new(PopupKind::AlreadyRunning)));
            return LaunchOutcome::AlreadyRunning;
        }
        self.publish(HomeUpdate::Info(InfoText::Connecting));

        match self.prepare_and_launch().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("play: critical error while preparing launch: {err}");
                self.reset(LaunchPhase::Idle).await;
                LaunchOutcome::Failed(err)
            }
        }
    }

    async fn prepare_and_launch(&self) -> Result<LaunchOutcome, String> {
        let mut config = self.store.read_config().await?;
        if config.account_selected.is_none() {
            ensure_account_selected(&*self.store).await?;
            config = self.store.read_config().await?;
        }

        let account = match config.account_selected.as_deref() {
            Some(id) => self.store.read_account(id).await?,
            None => None,
        };
        let Some(account) = account else {
            warn!("play: no stored account matches the selection");
            self.reset(LaunchPhase::Idle).await;
            self.publish(HomeUpdate::Popup(Popup::new(PopupKind::LoginRequired)));
            return Ok(LaunchOutcome::NeedsLogin);
        };

        self.set_phase(LaunchPhase::VerifyingInstance).await;
        let instances = self.remote.instance_list().await?;
        let mut instance = find_instance(&instances, config.instance_selct.as_deref()).cloned();
        if instance.is_none() {
            warn!("play: no valid instance selected, re-initializing instance selection");
            ensure_instance_selected(&*self.store, &instances).await?;
            config = self.store.read_config().await?;
            instance = find_instance(&instances, config.instance_selct.as_deref()).cloned();
        }
        let Some(instance) = instance else {
            error!("play: cannot find a valid instance even after re-initialization");
            self.reset(LaunchPhase::Idle).await;
            self.publish(HomeUpdate::Popup(Popup::new(PopupKind::NoInstance)));
            return Ok(LaunchOutcome::NoInstance);
        };

        let request = build_launch_request(&config, &account, &instance, &self.game_root);
        self.set_phase(LaunchPhase::Launching).await;
        info!(
            "play: launching instance {} ({}) as {}",
            instance.name, request.version, account.name
        );
        let session = match self.launcher.launch(request) {
            Ok(session) => session,
            Err(err) => {
                error!("play: launcher refused the request: {err}");
                self.reset(LaunchPhase::Errored(err.clone())).await;
                self.publish(HomeUpdate::Popup(Popup::new(PopupKind::LaunchFailed(Some(
                    err.clone(),
                )))));
                return Ok(LaunchOutcome::Failed(err));
            }
        };

        self.publish(HomeUpdate::Progress {
            current: 0,
            total: 0,
        });
        self.host.send(WindowSignal::ProgressLoad);
        self.publish(HomeUpdate::Info(InfoText::Verifying));

        let handle = tokio::spawn(pump_session(
            session,
            self.phase.clone(),
            self.updates.clone(),
            self.host.clone(),
            config.launcher_config.close_launcher,
        ));
        Ok(LaunchOutcome::Started(handle))
    }

    pub async fn handle_action(&self, action: UserAction) {
        match action {
            UserAction::ClickPlay => {
                info!("action: ClickPlay");
                let outcome = self.start_game().await;
                debug!("action: ClickPlay -> {outcome:?}");
            }
            UserAction::OpenInstanceMenu => {
                if let Err(err) = self.open_instance_menu().await {
                    error!("action: OpenInstanceMenu failed: {err}");
                }
            }
            UserAction::CloseInstanceMenu => self.publish(HomeUpdate::InstanceMenuClosed),
            UserAction::SelectInstance(name) => {
                if let Err(err) = self.select_instance(&name).await {
                    error!("action: SelectInstance failed: {err}");
                }
            }
            UserAction::OpenSettings => {
                self.publish(HomeUpdate::ChangePanel(Panel::Settings));
                if let Err(err) = self.load_config().await {
                    error!("action: OpenSettings failed to load config: {err}");
                }
            }
            UserAction::OpenSocial(url) => {
                if let Err(err) = open::that_detached(&url) {
                    warn!("action: unable to open {url}: {err}");
                }
            }
            UserAction::PopupChoice(panel) => self.publish(HomeUpdate::ChangePanel(panel)),
            UserAction::AddOfflineAccount(name) => {
                if let Err(err) = self.add_offline_account(&name).await {
                    warn!("action: AddOfflineAccount rejected: {err}");
                    self.publish(HomeUpdate::Popup(Popup::new(PopupKind::LaunchFailed(Some(
                        err,
                    )))));
                }
            }
            UserAction::SaveConfig(config) => {
                if let Err(err) = self.save_config(config).await {
                    error!("action: SaveConfig failed: {err}");
                }
            }
            UserAction::RefreshNews => {
                self.refresh_news().await;
            }
        }
    }

    async fn try_begin_launch(&self) -> bool {
        let mut phase = self.phase.lock().await;
        if phase.is_busy() {
            return false;
        }
        *phase = LaunchPhase::VerifyingAccount;
        self.publish(HomeUpdate::Phase(LaunchPhase::VerifyingAccount));
        true
    }

    async fn set_phase(&self, next: LaunchPhase) {
        *self.phase.lock().await = next.clone();
        self.publish(HomeUpdate::Phase(next));
    }

    async fn reset(&self, next: LaunchPhase) {
        self.set_phase(next).await;
        self.publish(HomeUpdate::ProgressHidden);
        self.publish(HomeUpdate::Info(InfoText::Ready));
    }

    fn publish(&self, update: HomeUpdate) {
        let _ = self.updates.send(update);
    }
}

/// Reflect launcher events into the UI until the game closes or fails.
async fn pump_session<H: HostBridge>(
    mut session: LaunchSession,
    phase: Arc<Mutex<LaunchPhase>>,
    updates: mpsc::UnboundedSender<HomeUpdate>,
    host: Arc<H>,
    close_behavior: CloseBehavior,
) {
    let mut seen_data = false;
    loop {
        let event = match session.next_event().await {
            Some(event) => event,
            None => {
                warn!("launch: launcher went away without reporting close");
                LaunchEvent::Close(None)
            }
        };

        let is_data = matches!(event, LaunchEvent::Data(_));
        let projection = project(&event, close_behavior, is_data && !seen_data);
        seen_data |= is_data;

        for signal in projection.signals {
            host.send(signal);
        }
        {
            let mut current = phase.lock().await;
            let next = current.after_event(&event);
            if next != *current {
                *current = next.clone();
                let _ = updates.send(HomeUpdate::Phase(next));
            }
        }
        for update in projection.updates {
            let _ = updates.send(update);
        }

        if event.is_terminal() {
            break;
        }
    }
}
