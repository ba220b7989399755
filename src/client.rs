use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::codec::Payload;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS};
use crate::session::{ChatService, ChatSetup, Conversation};
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, Model};

/// Base URL of the public API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Request timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Client for the Gemini API.
///
/// A client without a credential can be constructed; it fails with a
/// configuration error the first time a conversation is started.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: Option<String>,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the `GEMINI_API_KEY`
    /// (or `API_KEY`) environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(api_key_from_env);
        if api_key.is_none() {
            tracing::warn!(
                "API key not provided and neither GEMINI_API_KEY nor API_KEY is set; \
                 conversations cannot be started"
            );
        }
        Self::build(api_key, base_url, timeout)
    }

    fn build(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        url::Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// Returns true when an API key is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &Model) -> String {
        format!("{}models/{}:generateContent", self.base_url, model)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::configuration("API key not provided and GEMINI_API_KEY is not set")
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| Error::configuration("API key contains invalid characters"))?,
        );
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, &body, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    /// Send a `generateContent` request and return the parsed response.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.generate_content_inner(model, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            tracing::debug!(model = %model, error = %err, "generateContent failed");
        }
        result
    }

    async fn generate_content_inner(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let headers = self.default_headers()?;
        tracing::debug!(
            model = %model,
            contents = request.contents.len(),
            "sending generateContent request"
        );
        let response = self
            .client
            .post(self.endpoint(model))
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }
}

impl ChatService for Gemini {
    type Chat = GeminiChat;

    fn create_chat(&self, setup: ChatSetup) -> Result<GeminiChat> {
        if !self.has_credential() {
            return Err(Error::configuration(
                "API key not provided and GEMINI_API_KEY is not set",
            ));
        }
        Ok(GeminiChat {
            client: self.clone(),
            setup,
            history: Vec::new(),
        })
    }
}

/// A conversation held against the Gemini API.
///
/// The API is stateless, so the chat keeps the exchanged contents and sends
/// them along with every new message.
#[derive(Debug, Clone)]
pub struct GeminiChat {
    client: Gemini,
    setup: ChatSetup,
    history: Vec<Content>,
}

impl GeminiChat {
    /// The setup the conversation was started with.
    pub fn setup(&self) -> &ChatSetup {
        &self.setup
    }

    fn request_for(&self, content: Content) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(content);
        GenerateContentRequest::new(contents)
            .with_system_instruction(Content::system(self.setup.system_instruction.clone()))
            .with_generation_config(self.setup.generation_config.clone())
    }
}

#[async_trait::async_trait]
impl Conversation for GeminiChat {
    async fn send_message(&mut self, payload: Payload) -> Result<GenerateContentResponse> {
        let content = payload.into_content();
        let request = self.request_for(content.clone());
        let response = self
            .client
            .generate_content(&self.setup.model, &request)
            .await?;
        // A reply without content is not recorded, so the history keeps alternating roles.
        if let Some(reply) = response.first_content() {
            self.history.push(content);
            self.history.push(reply.clone());
        }
        Ok(response)
    }

    fn history(&self) -> &[Content] {
        &self.history
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

/// Maps an unsuccessful HTTP status and its body to an error.
fn error_from_status(status_code: u16, body: &str, retry_after: Option<u64>) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error);
    let status = detail.as_ref().and_then(|d| d.status.clone());
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.to_string());

    match status_code {
        400 => Error::bad_request(message, status),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, status, message),
    }
}
