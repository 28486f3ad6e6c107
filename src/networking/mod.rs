use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::engine::models::{Instance, NewsItem};

const NEWS_PATH: &str = "launcher/news-launcher/news.json";
const INSTANCES_PATH: &str = "files/?instance=null";

/// Remote source of the news feed and the instance list.
pub trait RemoteConfig: Send + Sync + 'static {
    fn news(&self) -> impl Future<Output = Result<Vec<NewsItem>, String>> + Send;

    fn instance_list(&self) -> impl Future<Output = Result<Vec<Instance>, String>> + Send;
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
    base_url: String,
}

impl NetworkClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("home-launcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = self.url(path);
        debug!("network: GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("GET {url} failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("GET {url} returned status {}", resp.status()));
        }
        resp.json::<T>()
            .await
            .map_err(|e| format!("invalid response from {url}: {e}"))
    }
}

impl RemoteConfig for NetworkClient {
    async fn news(&self) -> Result<Vec<NewsItem>, String> {
        self.get_json(NEWS_PATH).await
    }

    async fn instance_list(&self) -> Result<Vec<Instance>, String> {
        let raw: Value = self.get_json(INSTANCES_PATH).await?;
        parse_instance_list(raw)
    }
}

/// The server answers with an object keyed by instance name; arrays are accepted too.
pub fn parse_instance_list(raw: Value) -> Result<Vec<Instance>, String> {
    match raw {
        Value::Object(map) => parse_instance_map(map),
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<Instance>(item)
                    .map_err(|e| format!("invalid instance entry: {e}"))
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(format!("unexpected instance list payload: {other}")),
    }
}

fn parse_instance_map(map: Map<String, Value>) -> Result<Vec<Instance>, String> {
    let mut instances = Vec::with_capacity(map.len());
    for (name, value) in map {
        let mut instance: Instance = serde_json::from_value(value)
            .map_err(|e| format!("invalid instance '{name}': {e}"))?;
        instance.name = name;
        instances.push(instance);
    }
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_come_from_object_keys_in_order() {
        let raw = json!({
            "zeta": { "whitelistActive": true, "whitelist": ["Steve"] },
            "alpha": { "whitelistActive": false }
        });
        let list = parse_instance_list(raw).unwrap();
        let names: Vec<_> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(list[0].whitelist_active);
    }

    #[test]
    fn accepts_arrays_and_null() {
        let list = parse_instance_list(json!([{ "name": "main" }])).unwrap();
        assert_eq!(list[0].name, "main");
        assert!(parse_instance_list(Value::Null).unwrap().is_empty());
        assert!(parse_instance_list(json!("oops")).is_err());
    }

    #[test]
    fn joins_base_url_without_double_slash() {
        let client = NetworkClient::new("https://example.org/");
        assert_eq!(
            client.url(NEWS_PATH),
            "https://example.org/launcher/news-launcher/news.json"
        );
    }
}
