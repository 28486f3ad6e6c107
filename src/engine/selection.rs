use log::{info, warn};

use crate::engine::models::{Account, Instance};
use crate::engine::state::InstanceEntry;
use crate::storage::Store;

/// Make sure `account_selected` points at a stored account.
///
/// A missing or stale selection is replaced by the first stored account and
/// persisted. Without any account the config is left untouched.
pub async fn ensure_account_selected<S: Store>(store: &S) -> Result<Option<Account>, String> {
    let mut config = store.read_config().await?;
    let accounts = store.read_accounts().await?;

    if let Some(selected) = config.account_selected.as_deref()
        && let Some(account) = accounts.iter().find(|account| account.id == selected)
    {
        return Ok(Some(account.clone()));
    }

    let Some(first) = accounts.into_iter().next() else {
        return Ok(None);
    };
    config.account_selected = Some(first.id.clone());
    store.update_config(&config).await?;
    info!("selection: default account set to {}", first.id);
    Ok(Some(first))
}

/// Make sure `instance_selct` names an instance of the fresh `instances` list.
///
/// A missing or stale selection falls back to the first instance without an
/// active whitelist, then to the first instance, and is persisted. An empty
/// list leaves the config untouched.
pub async fn ensure_instance_selected<S: Store>(
    store: &S,
    instances: &[Instance],
) -> Result<Option<Instance>, String> {
    if instances.is_empty() {
        warn!("selection: no instances found, cannot initialize selection");
        return Ok(None);
    }

    let mut config = store.read_config().await?;
    if let Some(current) = find_instance(instances, config.instance_selct.as_deref()) {
        return Ok(Some(current.clone()));
    }

    let fallback = default_instance(instances);
    if let Some(instance) = fallback {
        config.instance_selct = Some(instance.name.clone());
        store.update_config(&config).await?;
        info!("selection: default instance set to {}", instance.name);
    }
    Ok(fallback.cloned())
}

pub fn find_instance<'a>(instances: &'a [Instance], name: Option<&str>) -> Option<&'a Instance> {
    let name = name?;
    instances.iter().find(|instance| instance.name == name)
}

fn default_instance(instances: &[Instance]) -> Option<&Instance> {
    instances
        .iter()
        .find(|instance| !instance.whitelist_active)
        .or_else(|| instances.first())
}

/// Instances the account may pick from, with the current one flagged.
pub fn visible_instances(
    instances: &[Instance],
    account: Option<&Account>,
    selected: Option<&str>,
) -> Vec<InstanceEntry> {
    instances
        .iter()
        .filter(|instance| instance.allows(account))
        .map(|instance| InstanceEntry {
            name: instance.name.clone(),
            active: Some(instance.name.as_str()) == selected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::ClientConfig;
    use crate::engine::testing::MemoryStore;

    fn instance(name: &str, whitelist_active: bool) -> Instance {
        Instance {
            name: name.into(),
            whitelist_active,
            ..Instance::default()
        }
    }

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: id.into(),
            name: name.into(),
            kind: Default::default(),
            uuid: None,
            access_token: None,
        }
    }

    #[tokio::test]
    async fn picks_first_account_when_unset() {
        let store = MemoryStore::with_accounts(vec![account("u1", "Steve"), account("u2", "Alex")]);
        let picked = ensure_account_selected(&store).await.unwrap();
        assert_eq!(picked.map(|a| a.id), Some("u1".into()));
        assert_eq!(store.config().account_selected.as_deref(), Some("u1"));
        assert_eq!(store.config_writes(), 1);
    }

    #[tokio::test]
    async fn replaces_stale_account_once() {
        let store = MemoryStore::with_accounts(vec![account("u1", "Steve")]);
        store.set_config(ClientConfig {
            account_selected: Some("gone".into()),
            ..ClientConfig::default()
        });
        ensure_account_selected(&store).await.unwrap();
        ensure_account_selected(&store).await.unwrap();
        assert_eq!(store.config().account_selected.as_deref(), Some("u1"));
        assert_eq!(store.config_writes(), 1);
    }

    #[tokio::test]
    async fn no_accounts_means_no_write() {
        let store = MemoryStore::default();
        assert_eq!(ensure_account_selected(&store).await.unwrap(), None);
        assert_eq!(store.config().account_selected, None);
        assert_eq!(store.config_writes(), 0);
    }

    #[tokio::test]
    async fn prefers_instance_without_whitelist() {
        let store = MemoryStore::default();
        let list = vec![instance("vip", true), instance("main", false)];
        let picked = ensure_instance_selected(&store, &list).await.unwrap();
        assert_eq!(picked.map(|i| i.name), Some("main".into()));
        assert_eq!(store.config().instance_selct.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn falls_back_to_first_instance() {
        let store = MemoryStore::default();
        let list = vec![instance("vip", true), instance("staff", true)];
        let picked = ensure_instance_selected(&store, &list).await.unwrap();
        assert_eq!(picked.map(|i| i.name), Some("vip".into()));
    }

    #[tokio::test]
    async fn empty_instance_list_leaves_config_alone() {
        let store = MemoryStore::default();
        assert_eq!(ensure_instance_selected(&store, &[]).await.unwrap(), None);
        assert_eq!(store.config().instance_selct, None);
        assert_eq!(store.config_writes(), 0);
    }

    #[tokio::test]
    async fn valid_instance_selection_is_kept_without_write() {
        let store = MemoryStore::default();
        store.set_config(ClientConfig {
            instance_selct: Some("vip".into()),
            ..ClientConfig::default()
        });
        let list = vec![instance("main", false), instance("vip", true)];
        let picked = ensure_instance_selected(&store, &list).await.unwrap();
        assert_eq!(picked.map(|i| i.name), Some("vip".into()));
        ensure_instance_selected(&store, &list).await.unwrap();
        assert_eq!(store.config_writes(), 0);
    }

    #[test]
    fn whitelisted_instances_need_the_account_name() {
        let mut vip = instance("vip", true);
        vip.whitelist = vec!["Steve".into()];
        let list = vec![instance("main", false), vip];

        let steve = account("u1", "Steve");
        let entries = visible_instances(&list, Some(&steve), Some("vip"));
        assert_eq!(
            entries,
            vec![
                InstanceEntry {
                    name: "main".into(),
                    active: false
                },
                InstanceEntry {
                    name: "vip".into(),
                    active: true
                },
            ]
        );

        let alex = account("u2", "Alex");
        assert_eq!(visible_instances(&list, Some(&alex), None).len(), 1);
        assert_eq!(visible_instances(&list, None, None).len(), 1);
    }
}
