use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_TTFB,
};
use crate::sse::process_sse;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable that overrides the API base URL.
pub const BASE_URL_VAR: &str = "SPARKCHAT_BASE_URL";

/// A boxed stream of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Client for the Gemini generative-language API.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

/// Read the API key from the environment.
///
/// Returns a configuration error naming every variable consulted when none is set.
pub fn api_key_from_env() -> Result<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            Error::configuration(format!(
                "API key not provided and none of {} is set",
                API_KEY_VARS.join(", ")
            ))
        })
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from `GEMINI_API_KEY`
    /// (falling back to `GOOGLE_API_KEY`). The base URL honors
    /// `SPARKCHAT_BASE_URL` when set.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, env::var(BASE_URL_VAR).ok(), None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => api_key_from_env()?,
        };
        // Reject keys that cannot travel in a header before any request is made
        HeaderValue::from_str(&api_key)
            .map_err(|_| Error::configuration("API key contains invalid characters"))?;

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request, response and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::configuration("API key contains invalid characters"))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    fn endpoint(&self, model: &Model, method: &str) -> Result<Url> {
        let model = model.to_string();
        let model = model.trim_start_matches("models/");
        Ok(self.base_url.join(&format!("models/{model}:{method}"))?)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let error_type = detail.as_ref().and_then(|d| d.status.clone());
        let error_message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.trim().to_string());

        match status_code {
            400 => Error::bad_request(error_message),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message),
        }
    }

    async fn post(
        &self,
        url: Url,
        headers: HeaderMap,
        request: &GenerateContentRequest,
    ) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Send a request and wait for the complete response.
    pub async fn generate(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent")?;
        if let Some(logger) = &self.logger {
            logger.log_request(&model.to_string(), request);
        }

        let start = Instant::now();
        let response = self.post(url, self.default_headers()?, request).await?;
        let response = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
            })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Some(logger) = &self.logger {
            logger.log_response(&response);
        }
        Ok(response)
    }

    /// Send a request and get a stream of response chunks.
    ///
    /// Each chunk is a partial `GenerateContentResponse` whose parts carry
    /// only the text generated since the previous chunk.
    pub async fn stream(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream> {
        let mut url = self.endpoint(model, "streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");
        if let Some(logger) = &self.logger {
            logger.log_request(&model.to_string(), request);
        }

        let mut headers = self.default_headers()?;
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let start = Instant::now();
        let response = self.post(url, headers, request).await?;
        STREAM_TTFB.add(start.elapsed().as_secs_f64());

        let chunks = process_sse(response.bytes_stream());
        match self.logger.clone() {
            Some(logger) => Ok(Box::pin(chunks.inspect(move |chunk| {
                if let Ok(chunk) = chunk {
                    logger.log_stream_chunk(chunk);
                }
            }))),
            None => Ok(Box::pin(chunks)),
        }
    }
}
