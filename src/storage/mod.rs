use std::future::Future;
use std::path::PathBuf;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::engine::models::{Account, ClientConfig};
use crate::env;

const CONFIG_FILE: &str = "configClient.json";
const ACCOUNTS_FILE: &str = "accounts.json";

/// Key-value persistence for the `configClient` singleton and the `accounts` collection.
pub trait Store: Send + Sync + 'static {
    /// Stored client config, or defaults when nothing was saved yet.
    fn read_config(&self) -> impl Future<Output = Result<ClientConfig, String>> + Send;

    fn update_config(&self, config: &ClientConfig)
    -> impl Future<Output = Result<(), String>> + Send;

    /// All accounts in insertion order.
    fn read_accounts(&self) -> impl Future<Output = Result<Vec<Account>, String>> + Send;

    fn read_account(&self, id: &str)
    -> impl Future<Output = Result<Option<Account>, String>> + Send {
        async move {
            let accounts = self.read_accounts().await?;
            Ok(accounts.into_iter().find(|account| account.id == id))
        }
    }

    /// Insert or replace the account with the same id.
    fn update_account(&self, account: &Account)
    -> impl Future<Output = Result<(), String>> + Send;
}

#[derive(Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    pub fn new() -> Self {
        // Best-effort directory creation; failures are surfaced on write.
        let _ = env::ensure_base_dirs();
        Self::with_dir(env::database_dir())
    }

    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, String> {
        let path = self.base_dir.join(file);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(format!("unable to read {}: {err}", path.display())),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| format!("corrupt {}: {err}", path.display()))
    }

    async fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), String> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| format!("unable to create database dir: {e}"))?;
        let path = self.base_dir.join(file);
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| format!("unable to encode {file}: {e}"))?;
        // Write to a sibling file first so a crash never leaves half a record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| format!("unable to persist {file}: {e}"))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| format!("unable to persist {file}: {e}"))?;
        debug!("storage: wrote {}", path.display());
        Ok(())
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for StorageManager {
    async fn read_config(&self) -> Result<ClientConfig, String> {
        Ok(self.read_json(CONFIG_FILE).await?.unwrap_or_default())
    }

    async fn update_config(&self, config: &ClientConfig) -> Result<(), String> {
        self.write_json(CONFIG_FILE, config).await
    }

    async fn read_accounts(&self) -> Result<Vec<Account>, String> {
        Ok(self.read_json(ACCOUNTS_FILE).await?.unwrap_or_default())
    }

    async fn update_account(&self, account: &Account) -> Result<(), String> {
        let mut accounts = self.read_accounts().await?;
        match accounts.iter_mut().find(|stored| stored.id == account.id) {
            Some(stored) => *stored = account.clone(),
            None => accounts.push(account.clone()),
        }
        if accounts.iter().filter(|a| a.name == account.name).count() > 1 {
            warn!("storage: several accounts share the name '{}'", account.name);
        }
        self.write_json(ACCOUNTS_FILE, &accounts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::CloseBehavior;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "home-launcher-{name}-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn missing_files_read_as_defaults() {
        let storage = StorageManager::with_dir(scratch_dir("empty"));
        assert_eq!(storage.read_config().await.unwrap(), ClientConfig::default());
        assert!(storage.read_accounts().await.unwrap().is_empty());
        assert_eq!(storage.read_account("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn persists_config_round_trip() {
        let dir = scratch_dir("config");
        let storage = StorageManager::with_dir(&dir);
        let mut config = ClientConfig::default();
        config.instance_selct = Some("main".into());
        config.launcher_config.close_launcher = CloseBehavior::KeepOpen;
        storage.update_config(&config).await.unwrap();

        let reopened = StorageManager::with_dir(&dir);
        assert_eq!(reopened.read_config().await.unwrap(), config);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn accounts_keep_insertion_order_and_replace_by_id() {
        let dir = scratch_dir("accounts");
        let storage = StorageManager::with_dir(&dir);
        let steve = Account::offline("Steve");
        let alex = Account::offline("Alex");
        storage.update_account(&steve).await.unwrap();
        storage.update_account(&alex).await.unwrap();

        let mut renamed = steve.clone();
        renamed.access_token = Some("token".into());
        storage.update_account(&renamed).await.unwrap();

        let accounts = storage.read_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0], renamed);
        assert_eq!(accounts[1], alex);
        assert_eq!(
            storage.read_account(&alex.id).await.unwrap().as_ref(),
            Some(&alex)
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_config_is_reported() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), b"{ not json").unwrap();
        let storage = StorageManager::with_dir(&dir);
        assert!(storage.read_config().await.is_err());
        let _ = std::fs::remove_dir_all(dir);
    }
}
