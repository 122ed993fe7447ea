// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! HTTP feed client - reads the latest entry of the insole's channel feed

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Channel, ChannelValue, FeedError, RawSnapshot, ReadingSource};
use crate::config::FeedConfig;

/// Client for the `feeds/last.json` endpoint
pub struct HttpFeed {
    id: String,
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        Ok(Self {
            id: format!("feed-{}", config.channel_id),
            client,
            url: config.latest_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReadingSource for HttpFeed {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_latest(&self) -> Result<RawSnapshot, FeedError> {
        let mut request = self.client.get(&self.url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let snapshot = parse_entry(&body)?;
        debug!("Fetched {} -> {:?}", self.id, snapshot);
        Ok(snapshot)
    }
}

/// Parse a feed entry body into a snapshot.
///
/// The body must be a JSON object; individual fields that are missing, null,
/// empty or non-numeric are left unresolved.
pub fn parse_entry(body: &str) -> Result<RawSnapshot, FeedError> {
    let json: Value = serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;
    let entry = json
        .as_object()
        .ok_or_else(|| FeedError::Malformed("expected a JSON object".to_string()))?;

    let mut snapshot = RawSnapshot::default();
    for channel in Channel::ALL {
        let value = match entry.get(channel.feed_field()) {
            Some(v) => parse_field(channel, v),
            None => ChannelValue::Unresolved,
        };
        snapshot = snapshot.with(channel, value);
    }
    Ok(snapshot)
}

fn parse_field(channel: Channel, value: &Value) -> ChannelValue {
    let parsed = match value {
        Value::String(s) if s.trim().is_empty() => return ChannelValue::Unresolved,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        Value::Null => return ChannelValue::Unresolved,
        _ => None,
    };

    match parsed.filter(|v| v.is_finite()) {
        Some(v) => ChannelValue::Reading(v),
        None => {
            warn!("Ignoring unparseable {} value: {}", channel.feed_field(), value);
            ChannelValue::Unresolved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn feed_config(base_url: String) -> FeedConfig {
        FeedConfig {
            base_url,
            channel_id: "42".to_string(),
            api_key: Some("READKEY".to_string()),
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_parse_full_entry() {
        let body = r#"{"created_at":"2025-03-01T10:00:00Z","entry_id":7,
            "field1":"36.5","field2":"37.0","field3":"420","field4":"150"}"#;
        let snapshot = parse_entry(body).unwrap();
        assert_eq!(snapshot, RawSnapshot::new(36.5, 37.0, 420.0, 150.0));
    }

    #[test]
    fn test_parse_partial_entry() {
        let snapshot = parse_entry(r#"{"field1":"36.0","field2":null,"field3":""}"#).unwrap();
        assert_eq!(snapshot.temp1, ChannelValue::Reading(36.0));
        assert_eq!(snapshot.temp2, ChannelValue::Unresolved);
        assert_eq!(snapshot.heel_pressure, ChannelValue::Unresolved);
        assert_eq!(snapshot.ball_pressure, ChannelValue::Unresolved);
    }

    #[test]
    fn test_parse_accepts_numbers_and_skips_garbage() {
        let body = r#"{"field1":36.2,"field2":"abc","field3":"NaN","field4":" 99.5 "}"#;
        let snapshot = parse_entry(body).unwrap();
        assert_eq!(snapshot.temp1, ChannelValue::Reading(36.2));
        assert_eq!(snapshot.temp2, ChannelValue::Unresolved);
        assert_eq!(snapshot.heel_pressure, ChannelValue::Unresolved);
        assert_eq!(snapshot.ball_pressure, ChannelValue::Reading(99.5));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(parse_entry("not json"), Err(FeedError::Malformed(_))));
        assert!(matches!(parse_entry("[1,2,3]"), Err(FeedError::Malformed(_))));
        // ThingSpeak answers "-1" for an unknown channel
        assert!(matches!(parse_entry("-1"), Err(FeedError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_latest_sends_api_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/channels/42/feeds/last.json")
                    .query_param("api_key", "READKEY");
                then.status(200)
                    .json_body(json!({
                        "field1": "36.5",
                        "field2": "37.0",
                        "field3": "420",
                        "field4": "150"
                    }));
            })
            .await;

        let feed = HttpFeed::new(&feed_config(server.base_url())).unwrap();
        let snapshot = feed.fetch_latest().await.unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.heel_pressure.to_string(), "420.0");
    }

    #[tokio::test]
    async fn test_fetch_latest_maps_http_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/42/feeds/last.json");
                then.status(503);
            })
            .await;

        let feed = HttpFeed::new(&feed_config(server.base_url())).unwrap();
        let err = feed.fetch_latest().await.unwrap_err();
        assert!(matches!(err, FeedError::Status(503)));
    }

    #[tokio::test]
    async fn test_fetch_latest_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/42/feeds/last.json");
                then.status(200)
                    .delay(Duration::from_secs(4))
                    .json_body(json!({"field1": "36.5"}));
            })
            .await;

        let mut config = feed_config(server.base_url());
        config.timeout_secs = 1;
        let feed = HttpFeed::new(&config).unwrap();
        let err = feed.fetch_latest().await.unwrap_err();
        assert!(matches!(err, FeedError::Timeout));
    }
}
