use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::traits::ScoreOracle;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SYSTEM_PROMPT: &str = "You are a job relevance scoring assistant. Evaluate how well a job posting matches the candidate criteria. Respond ONLY with a JSON object of the form {\"score\": 0.XX}. Do not include explanations.";

/// OpenAI-compatible chat-completion client used for deep relevance scoring.
///
/// Works with any OpenAI-compatible API. The model is asked for a single
/// `{"score": 0.XX}` object; a bare-float scan handles models that reply
/// with extra prose anyway.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
    system_prompt: String,
}

impl OpenAiOracle {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ScorePayload {
    score: f64,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ScoreOracle for OpenAiOracle {
    async fn score(&self, prompt: &str) -> Result<f64, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            // Low temperature and a tight token budget: the reply is one
            // small JSON object.
            temperature: 0.2,
            max_tokens: 50,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if status_code == 429 {
                return Err(AppError::RateLimitExceeded);
            }

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));

            return Err(AppError::OracleError {
                message,
                status_code,
                retryable: status_code >= 500,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse oracle response: {e}")))?;

        let content = chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| AppError::OracleError {
                message: "Empty response from oracle".into(),
                status_code: 200,
                retryable: false,
            })?;

        parse_score(content).ok_or_else(|| AppError::OracleError {
            message: format!("Unparseable score reply: {content}"),
            status_code: 200,
            retryable: false,
        })
    }
}

/// Parse the score out of the model reply. Strict `{"score": ..}` JSON
/// first, then the first float found anywhere in the text.
fn parse_score(content: &str) -> Option<f64> {
    let trimmed = content.trim();
    if let Ok(payload) = serde_json::from_str::<ScorePayload>(trimmed) {
        return Some(payload.score);
    }
    first_float(trimmed)
}

fn first_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let mut seen_dot = false;
    // A dot right before the first digit is the decimal point of a
    // leading-dot number (".5"), not sentence punctuation.
    if start > 0 && bytes[start - 1] == b'.' {
        start -= 1;
        seen_dot = true;
    }
    let mut end = start + if seen_dot { 1 } else { 0 };
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    s[start..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_reply() {
        assert_eq!(parse_score(r#"{"score": 0.85}"#), Some(0.85));
    }

    #[test]
    fn json_with_surrounding_whitespace() {
        assert_eq!(parse_score("  {\"score\": 0.4}\n"), Some(0.4));
    }

    #[test]
    fn prose_reply_falls_back_to_float_scan() {
        assert_eq!(parse_score("The relevance score is 0.72 overall."), Some(0.72));
    }

    #[test]
    fn leading_dot_decimal_keeps_its_point() {
        assert_eq!(parse_score("score: .5"), Some(0.5));
        assert_eq!(parse_score(".85"), Some(0.85));
    }

    #[test]
    fn no_number_is_none() {
        assert_eq!(parse_score("cannot determine"), None);
    }

    #[test]
    fn trailing_period_not_part_of_number() {
        assert_eq!(parse_score("I rate it 1."), Some(1.0));
    }
}
