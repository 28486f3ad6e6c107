//! In-memory collaborators for exercising the home controller without disk,
//! network, or a real launcher.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::engine::launch::{LaunchEvent, WindowSignal};
use crate::engine::models::{Account, ClientConfig, Instance, LaunchRequest, NewsItem};
use crate::host::HostBridge;
use crate::networking::RemoteConfig;
use crate::process::{GameLauncher, LaunchSession};
use crate::storage::Store;

#[derive(Default)]
pub struct MemoryStore {
    config: Mutex<ClientConfig>,
    accounts: Mutex<Vec<Account>>,
    config_writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Self::default()
        }
    }

    pub fn set_config(&self, config: ClientConfig) {
        *self.config.lock().unwrap() = config;
    }

    pub fn config(&self) -> ClientConfig {
        self.config.lock().unwrap().clone()
    }

    pub fn config_writes(&self) -> usize {
        *self.config_writes.lock().unwrap()
    }
}

impl Store for MemoryStore {
    async fn read_config(&self) -> Result<ClientConfig, String> {
        Ok(self.config())
    }

    async fn update_config(&self, config: &ClientConfig) -> Result<(), String> {
        *self.config.lock().unwrap() = config.clone();
        *self.config_writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn read_accounts(&self) -> Result<Vec<Account>, String> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn update_account(&self, account: &Account) -> Result<(), String> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|stored| stored.id == account.id) {
            Some(stored) => *stored = account.clone(),
            None => accounts.push(account.clone()),
        }
        Ok(())
    }
}

pub struct FakeRemote {
    pub news: Result<Vec<NewsItem>, String>,
    pub instances: Result<Vec<Instance>, String>,
}

impl FakeRemote {
    pub fn with_instances(instances: Vec<Instance>) -> Self {
        Self {
            news: Ok(Vec::new()),
            instances: Ok(instances),
        }
    }
}

impl RemoteConfig for FakeRemote {
    async fn news(&self) -> Result<Vec<NewsItem>, String> {
        self.news.clone()
    }

    async fn instance_list(&self) -> Result<Vec<Instance>, String> {
        self.instances.clone()
    }
}

/// Replays scripted events; with `hold_open` the session stays alive until `finish`.
#[derive(Default)]
pub struct FakeLauncher {
    pub script: Vec<LaunchEvent>,
    pub fail_with: Option<String>,
    pub hold_open: bool,
    requests: Mutex<Vec<LaunchRequest>>,
    held: Mutex<Vec<mpsc::UnboundedSender<LaunchEvent>>>,
}

impl FakeLauncher {
    pub fn scripted(script: Vec<LaunchEvent>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Replays `script` and keeps the session open until `finish`.
    pub fn holding(script: Vec<LaunchEvent>) -> Self {
        Self {
            script,
            hold_open: true,
            ..Self::default()
        }
    }

    /// Refuses every launch request with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn finish(&self, event: LaunchEvent) {
        for tx in self.held.lock().unwrap().drain(..) {
            let _ = tx.send(event.clone());
        }
    }
}

impl GameLauncher for FakeLauncher {
    fn launch(&self, request: LaunchRequest) -> Result<LaunchSession, String> {
        self.requests.lock().unwrap().push(request);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let (tx, session) = LaunchSession::channel();
        for event in &self.script {
            let _ = tx.send(event.clone());
        }
        if self.hold_open {
            self.held.lock().unwrap().push(tx);
        }
        Ok(session)
    }
}

#[derive(Default)]
pub struct RecordingHost {
    signals: Mutex<Vec<WindowSignal>>,
}

impl RecordingHost {
    pub fn signals(&self) -> Vec<WindowSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl HostBridge for RecordingHost {
    fn send(&self, signal: WindowSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}
