use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Persisted launcher-side client settings (`configClient` collection).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub account_selected: Option<String>,
    #[serde(default)]
    pub instance_selct: Option<String>,
    #[serde(default)]
    pub java_config: JavaConfig,
    #[serde(default)]
    pub game_config: GameConfig,
    #[serde(default)]
    pub launcher_config: LauncherConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JavaConfig {
    #[serde(default)]
    pub java_path: Option<String>,
    #[serde(default)]
    pub java_memory: MemoryBounds,
}

/// Memory bounds in GiB.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for MemoryBounds {
    fn default() -> Self {
        Self { min: 2.0, max: 4.0 }
    }
}

impl MemoryBounds {
    /// JVM-style size string, e.g. `2048M`.
    pub fn min_arg(&self) -> String {
        gib_to_mib_arg(self.min)
    }

    pub fn max_arg(&self) -> String {
        gib_to_mib_arg(self.max)
    }
}

fn gib_to_mib_arg(gib: f64) -> String {
    let mib = (gib.max(0.0) * 1024.0).round() as u64;
    format!("{mib}M")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub screen_size: ScreenSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 854,
            height: 480,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default = "default_download_multi")]
    pub download_multi: u32,
    #[serde(default)]
    pub theme: Option<String>,
    /// Language code picked in the settings panel.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "closeLauncher", default)]
    pub close_launcher: CloseBehavior,
    #[serde(rename = "intelEnabledMac", default = "default_true")]
    pub intel_enabled_mac: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            download_multi: default_download_multi(),
            theme: None,
            language: None,
            close_launcher: CloseBehavior::default(),
            intel_enabled_mac: true,
        }
    }
}

fn default_download_multi() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// What happens to the launcher window while the game runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseBehavior {
    /// The game process is tied to the launcher; nothing is hidden.
    #[serde(rename = "close-all")]
    CloseAll,
    /// Window hidden while the game runs and shown again on exit.
    #[default]
    #[serde(rename = "close-launcher")]
    CloseLauncher,
    #[serde(rename = "close-none", other)]
    KeepOpen,
}

impl CloseBehavior {
    pub const ALL: [CloseBehavior; 3] = [
        CloseBehavior::CloseAll,
        CloseBehavior::CloseLauncher,
        CloseBehavior::KeepOpen,
    ];

    /// Whether the launched process outlives the launcher.
    pub fn detached(self) -> bool {
        self != CloseBehavior::CloseAll
    }

    pub fn hides_window(self) -> bool {
        self == CloseBehavior::CloseLauncher
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Premium,
    #[default]
    Offline,
}

/// Stored login credentials (`accounts` collection, keyed by `id`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: AccountKind,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Account {
    /// Offline account whose id is stable for a given player name.
    pub fn offline(name: &str) -> Self {
        let uuid = offline_uuid(name);
        Self {
            id: uuid.replace('-', ""),
            name: name.to_owned(),
            kind: AccountKind::Offline,
            uuid: Some(uuid),
            access_token: None,
        }
    }
}

fn offline_uuid(name: &str) -> String {
    let digest = Sha256::digest(format!("OfflinePlayer:{name}").as_bytes());
    let hex: String = digest.iter().take(16).map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Server status block shown in the header for the selected instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceStatus {
    #[serde(rename = "nameServer", default)]
    pub name_server: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderSpec {
    #[serde(default)]
    pub minecraft_version: String,
    #[serde(default = "default_loader_type")]
    pub loadder_type: String,
    #[serde(default)]
    pub loadder_version: String,
}

fn default_loader_type() -> String {
    "none".into()
}

/// Remote launch target, fetched fresh on every use.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "whitelistActive", default)]
    pub whitelist_active: bool,
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default)]
    pub loadder: LoaderSpec,
    #[serde(default)]
    pub verify: bool,
    #[serde(default)]
    pub ignored: Vec<String>,
    #[serde(default)]
    pub jvm_args: Vec<String>,
    #[serde(default)]
    pub game_args: Vec<String>,
}

impl Instance {
    pub fn allows(&self, account: Option<&Account>) -> bool {
        if !self.whitelist_active {
            return true;
        }
        account.is_some_and(|account| self.whitelist.iter().any(|name| *name == account.name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_date: serde_json::Value,
    #[serde(default)]
    pub content: String,
}

/// Request record handed to the external launcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub url: String,
    pub authenticator: Account,
    pub timeout: u64,
    pub path: PathBuf,
    pub instance: String,
    pub version: String,
    pub detached: bool,
    pub download_file_multiple: u32,
    pub intel_enabled_mac: bool,
    pub loader: LaunchLoader,
    pub verify: bool,
    pub ignored: Vec<String>,
    pub java: LaunchJava,
    #[serde(rename = "JVM_ARGS")]
    pub jvm_args: Vec<String>,
    #[serde(rename = "GAME_ARGS")]
    pub game_args: Vec<String>,
    pub screen: ScreenSize,
    pub memory: LaunchMemory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLoader {
    #[serde(rename = "type")]
    pub loader_type: String,
    pub build: String,
    pub enable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchJava {
    pub path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMemory {
    pub min: String,
    pub max: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_behavior_drives_detach_and_hide() {
        assert!(!CloseBehavior::CloseAll.detached());
        assert!(!CloseBehavior::CloseAll.hides_window());
        assert!(CloseBehavior::CloseLauncher.detached());
        assert!(CloseBehavior::CloseLauncher.hides_window());
        assert!(CloseBehavior::KeepOpen.detached());
        assert!(!CloseBehavior::KeepOpen.hides_window());
    }

    #[test]
    fn unknown_close_behavior_keeps_launcher_open() {
        let parsed: CloseBehavior = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(parsed, CloseBehavior::KeepOpen);
        let parsed: CloseBehavior = serde_json::from_str("\"close-all\"").unwrap();
        assert_eq!(parsed, CloseBehavior::CloseAll);
    }

    #[test]
    fn reads_sparse_client_config_with_defaults() {
        let raw = r#"{
            "account_selected": "u1",
            "launcher_config": { "closeLauncher": "close-all" }
        }"#;
        let config: ClientConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.account_selected.as_deref(), Some("u1"));
        assert_eq!(config.instance_selct, None);
        assert_eq!(config.launcher_config.close_launcher, CloseBehavior::CloseAll);
        assert_eq!(config.launcher_config.download_multi, 5);
        assert!(config.launcher_config.intel_enabled_mac);
        assert_eq!(config.java_config.java_memory, MemoryBounds { min: 2.0, max: 4.0 });
        assert_eq!(config.game_config.screen_size, ScreenSize { width: 854, height: 480 });
    }

    #[test]
    fn memory_args_are_in_mebibytes() {
        let bounds = MemoryBounds { min: 1.5, max: 6.0 };
        assert_eq!(bounds.min_arg(), "1536M");
        assert_eq!(bounds.max_arg(), "6144M");
    }

    #[test]
    fn offline_ids_are_stable_per_name() {
        let a = Account::offline("Steve");
        let b = Account::offline("Steve");
        let c = Account::offline("Alex");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 32);
        assert_eq!(a.uuid.as_deref().map(str::len), Some(36));
    }

    #[test]
    fn whitelist_requires_matching_account_name() {
        let instance = Instance {
            name: "vip".into(),
            whitelist_active: true,
            whitelist: vec!["Steve".into()],
            ..Instance::default()
        };
        assert!(instance.allows(Some(&Account::offline("Steve"))));
        assert!(!instance.allows(Some(&Account::offline("Alex"))));
        assert!(!instance.allows(None));

        let open = Instance {
            name: "main".into(),
            ..Instance::default()
        };
        assert!(open.allows(None));
    }

    #[test]
    fn parses_remote_instance_fields() {
        let raw = r#"{
            "url": "https://example.org/files/main",
            "whitelistActive": false,
            "status": { "nameServer": "Main", "ip": "play.example.org", "port": 25565 },
            "loadder": { "minecraft_version": "1.20.1", "loadder_type": "forge", "loadder_version": "47.2.0" },
            "verify": true,
            "ignored": ["config", "logs"]
        }"#;
        let instance: Instance = serde_json::from_str(raw).unwrap();
        assert_eq!(instance.status.port, 25565);
        assert_eq!(instance.loadder.loadder_type, "forge");
        assert!(instance.jvm_args.is_empty());
        assert_eq!(instance.ignored.len(), 2);
    }
}
