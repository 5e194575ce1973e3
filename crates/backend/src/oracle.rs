//! LLM ranking oracle over the OpenRouter chat-completions API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use smartdine_model::{OracleRecommendation, OracleResponse};
use smartdine_query::{ConciergePrompt, PromptDialect};

use crate::{check_status, http_client, BackendError, RankingOracle};

/// Analysis returned when the model output holds no usable JSON.
pub const UNPARSEABLE_ANALYSIS: &str = "Could not analyze";

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "google/gemini-2.0-flash-exp:free".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "http://localhost:4000".to_string(),
            title: "Smart Dine Backend".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct OpenRouterOracle {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

impl OpenRouterOracle {
    pub fn new(config: OpenRouterConfig) -> Result<Self, BackendError> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Slice from the first `open` to the last `close`, if both exist in that order.
fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn as_response(object: &str) -> Option<OracleResponse> {
    serde_json::from_str(object).ok()
}

fn as_pick_list(list: &str) -> Option<OracleResponse> {
    let recommendations = serde_json::from_str::<Vec<OracleRecommendation>>(list).ok()?;
    Some(OracleResponse {
        analysis: String::new(),
        recommendations,
    })
}

/// Parse free-form model output into an oracle response.
///
/// Whichever JSON shape opens first wins: an outermost `{...}` response
/// object or a bare `[...]` list of picks. The other shape is tried when
/// the first does not parse. Anything else yields an empty response with a
/// "could not analyze" note.
pub fn parse_oracle_output(text: &str) -> OracleResponse {
    let object = outermost(text, '{', '}');
    let list = outermost(text, '[', ']');
    let list_first = match (text.find('['), text.find('{')) {
        (Some(bracket), Some(brace)) => bracket < brace,
        (Some(_), None) => true,
        _ => false,
    };

    let parsed = if list_first {
        list.and_then(as_pick_list).or_else(|| object.and_then(as_response))
    } else {
        object.and_then(as_response).or_else(|| list.and_then(as_pick_list))
    };

    parsed.unwrap_or_else(|| OracleResponse {
        analysis: UNPARSEABLE_ANALYSIS.to_string(),
        recommendations: Vec::new(),
    })
}

#[async_trait]
impl RankingOracle for OpenRouterOracle {
    async fn rank(&self, query: &str, catalog_context: &str) -> Result<OracleResponse, BackendError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::Unavailable("OpenRouter API key not configured".to_string()))?;

        let prompt = ConciergePrompt
            .translate(query, catalog_context)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        tracing::debug!(model = %self.config.model, "Calling ranking oracle");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&json!({
                "model": self.config.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let completion: ChatCompletion = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BackendError::Parse("Missing choices".to_string()))?;

        tracing::debug!(output = %content, "Oracle raw output");
        Ok(parse_oracle_output(&content))
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let text = r#"Sure! Here you go:
```json
{ "analysis": "Craving something sweet",
  "recommendations": [ { "id": "r010", "reason": "Cakes", "suggested_item": "Red Velvet Cake" } ] }
```
Enjoy!"#;
        let response = parse_oracle_output(text);
        assert_eq!(response.analysis, "Craving something sweet");
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].suggested_item.as_deref(), Some("Red Velvet Cake"));
    }

    #[test]
    fn test_parse_bare_list() {
        let response = parse_oracle_output(r#"[ { "id": "r001", "reason": "Tiffin" } ]"#);
        assert_eq!(response.analysis, "");
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].id, "r001");
        assert_eq!(response.recommendations[0].reason, "Tiffin");
    }

    #[test]
    fn test_parse_bare_list_in_prose() {
        let text = r#"Picks: [ { "id": "r002" }, { "id": "r005", "suggested_item": "Filter Coffee" } ] hope that helps"#;
        let response = parse_oracle_output(text);
        let ids: Vec<&str> = response.recommendations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r002", "r005"]);
        assert_eq!(response.recommendations[1].suggested_item.as_deref(), Some("Filter Coffee"));
    }

    #[test]
    fn test_object_holding_list_is_a_response() {
        let text = r#"{ "analysis": "Late night", "recommendations": [ { "id": "r007" } ] }"#;
        let response = parse_oracle_output(text);
        assert_eq!(response.analysis, "Late night");
        assert_eq!(response.recommendations[0].id, "r007");
    }

    #[test]
    fn test_null_reason_keeps_other_picks() {
        let text = r#"{"analysis":"x","recommendations":[{"id":"r1","reason":null},{"id":"r2","reason":"Cosy"}]}"#;
        let response = parse_oracle_output(text);
        assert_eq!(response.analysis, "x");
        assert_eq!(response.recommendations.len(), 2);
        assert_eq!(response.recommendations[0].reason, "");
        assert_eq!(response.recommendations[1].reason, "Cosy");
    }

    #[test]
    fn test_unparseable_output() {
        for text in ["I cannot help with that.", "{ broken", "} backwards {"] {
            let response = parse_oracle_output(text);
            assert_eq!(response.analysis, UNPARSEABLE_ANALYSIS);
            assert!(response.recommendations.is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let oracle = OpenRouterOracle::new(OpenRouterConfig::default()).unwrap();
        let result = oracle.rank("dosa", "ID: r001").await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
    }
}
