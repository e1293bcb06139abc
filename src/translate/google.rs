use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{DubError, Result};
use super::Translator;

/// Google Translate web endpoint (`translate_a/single`, client `gtx`)
pub struct GoogleTranslator {
    client: Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("deepdub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_language.as_str()),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| DubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Translation(format!(
                "Google Translate error {}: {}", status, error_text
            )));
        }

        let body: Value = response.json().await
            .map_err(|e| DubError::Translation(format!("Failed to parse response: {}", e)))?;

        parse_translation(&body)
    }
}

/// The reply is `[[["translated", "source", ...], ...], ...]`; one inner
/// array per sentence chunk.
pub fn parse_translation(body: &Value) -> Result<String> {
    let chunks = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DubError::Translation(format!("Unexpected response shape: {}", body)))?;

    let translated: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
        .collect();

    let translated = translated.trim();
    if translated.is_empty() {
        return Err(DubError::Translation("Empty translation received".to_string()));
    }

    Ok(translated.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_chunk() {
        let body = json!([[["Hola", "Hello", null, null, 10]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "Hola");
    }

    #[test]
    fn test_parse_joins_chunks() {
        let body = json!([[["Bonjour. ", "Hello. ", null, null, 3], ["Monde", "World", null, null, 3]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "Bonjour. Monde");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(parse_translation(&json!({"error": "quota"})).is_err());
        assert!(parse_translation(&json!([null, null, "en"])).is_err());
        assert!(parse_translation(&json!([[["  ", "x"]]])).is_err());
    }
}
