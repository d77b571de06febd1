//! REST implementation of [`Backend`] and [`LogSource`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use super::{Backend, LogFrames, LogSource, TransportError, sse::SseDecoder};
use crate::{
    config::AppConfig,
    http_client::{create_base_client, create_retryable_http_client, create_stream_client},
    models::{
        ActivateRequest, AnalyzeAbiRequest, Contract, Event, ExitRequest, HealthDetail,
        LegalAnalyzeRequest, Metrics, MonitorOnceResponse, NotifyRequest, RangePreset,
        RegisterContractRequest, RegisterContractResponse,
    },
};

#[derive(Deserialize)]
struct ContractsEnvelope {
    #[serde(default)]
    contracts: Vec<Contract>,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct MetricsEnvelope {
    #[serde(default)]
    metrics: Metrics,
}

/// Talks to the backend over HTTP.
///
/// Request/response calls go through the retry-capable middleware client;
/// the log stream uses a plain client without an overall request timeout.
#[derive(Clone)]
pub struct RestBackend {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
    stream_client: reqwest::Client,
}

impl RestBackend {
    /// Creates a backend from already-built clients.
    pub fn new(
        base_url: Url,
        client: Arc<ClientWithMiddleware>,
        stream_client: reqwest::Client,
    ) -> Self {
        Self { base_url, client, stream_client }
    }

    /// Builds the HTTP clients described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        let base_client = create_base_client(&config.http_base_config)?;
        let client = create_retryable_http_client(&config.http_retry_config, base_client);
        let stream_client = create_stream_client(&config.http_base_config)?;
        Ok(Self::new(config.backend_url.clone(), Arc::new(client), stream_client))
    }

    /// The configured base address.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins `path` onto the base address, keeping any path prefix the base
    /// address already has.
    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    fn contract_path(id: &str, suffix: &str) -> String {
        format!("contracts/{}{suffix}", urlencoding::encode(id))
    }

    /// `GET path?query` decoded as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path)?;
        self.execute("GET", self.client.get(url).query(query)).await
    }

    /// `POST path` with an optional JSON body, decoded as `T`.
    pub async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute("POST", request).await
    }

    /// `DELETE path`, decoded as `T`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path)?;
        self.execute("DELETE", self.client.delete(url)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(method, %url, %status, "Backend request failed");
            return Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        tracing::debug!(method, %url, %status, bytes = body.len(), "Backend request completed");

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn health_detail(&self) -> Result<HealthDetail, TransportError> {
        self.get("health/detail", &[]).await
    }

    async fn metrics(&self) -> Result<Metrics, TransportError> {
        let envelope: MetricsEnvelope = self.get("metrics", &[]).await?;
        Ok(envelope.metrics)
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, TransportError> {
        let envelope: ContractsEnvelope = self.get("contracts", &[]).await?;
        Ok(envelope.contracts)
    }

    async fn register_contract(
        &self,
        request: &RegisterContractRequest,
    ) -> Result<RegisterContractResponse, TransportError> {
        self.post("register-contract", Some(request)).await
    }

    async fn set_contract_active(&self, id: &str, active: bool) -> Result<Value, TransportError> {
        let path = Self::contract_path(id, "/activate");
        self.post(&path, Some(&ActivateRequest { active })).await
    }

    async fn delete_contract(&self, id: &str) -> Result<(), TransportError> {
        let _: Value = self.delete(&Self::contract_path(id, "")).await?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, TransportError> {
        let envelope: EventsEnvelope = self.get("events", &[]).await?;
        Ok(envelope.events)
    }

    async fn list_contract_events(
        &self,
        id: &str,
        range: Option<RangePreset>,
    ) -> Result<Vec<Event>, TransportError> {
        let path = Self::contract_path(id, "/events");
        let query: Vec<(&str, &str)> =
            range.iter().map(|range| ("range", range.as_query_value())).collect();
        let envelope: EventsEnvelope = self.get(&path, &query).await?;
        Ok(envelope.events)
    }

    async fn monitor_once(&self) -> Result<MonitorOnceResponse, TransportError> {
        self.post::<Value, _>("monitor-once", None).await
    }

    async fn notify(&self, request: &NotifyRequest) -> Result<Value, TransportError> {
        self.post("notify", Some(request)).await
    }

    async fn legal_analyze(&self, request: &LegalAnalyzeRequest) -> Result<Value, TransportError> {
        self.post("legal-analyze", Some(request)).await
    }

    async fn analyze_abi(&self, request: &AnalyzeAbiRequest) -> Result<Value, TransportError> {
        self.post("analyze-abi", Some(request)).await
    }

    async fn exit_broadcast(&self, request: &ExitRequest) -> Result<Value, TransportError> {
        self.post("exit", Some(request)).await
    }
}

#[async_trait]
impl LogSource for RestBackend {
    async fn subscribe(&self) -> Result<LogFrames, TransportError> {
        let url = self.endpoint("logs/stream")?;
        tracing::debug!(%url, "Opening log stream");

        let response = self
            .stream_client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let mut decoder = SseDecoder::new();
        let frames = response
            .bytes_stream()
            .map(move |chunk| chunk.map(|bytes| decoder.push(&bytes)).map_err(TransportError::from))
            .flat_map(|decoded| {
                let items: Vec<Result<String, TransportError>> = match decoded {
                    Ok(events) => events.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed();
        Ok(frames)
    }
}
