//! HTTP implementation of the order backend.

use super::{BackendError, OrderBackend};
use crate::config::ClientConfig;
use crate::core::{OrderQuery, OrderResponse, PaginatedOrders, UpdateOrderStatus};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Order backend reached over HTTP with JSON bodies.
pub struct HttpOrderBackend {
    http: Client,
    base_url: String,
    api_token: Option<String>,
    transitions_path: Option<String>,
}

impl HttpOrderBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(BackendError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            transitions_path: config.transitions_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(BackendError::Transport)?;

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }
        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| v.get("message")).and_then(|m| match m {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    });

    message.unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

#[async_trait]
impl OrderBackend for HttpOrderBackend {
    async fn update_order_status(
        &self,
        id: Uuid,
        body: &UpdateOrderStatus,
    ) -> Result<OrderResponse, BackendError> {
        tracing::debug!(order_id = %id, status = %body.status, "PATCH order status");
        let request = self.http.patch(self.url(&format!("/orders/{id}/status"))).json(body);
        self.send(request).await
    }

    async fn get_order(&self, id: Uuid) -> Result<OrderResponse, BackendError> {
        let request = self.http.get(self.url(&format!("/orders/{id}")));
        self.send(request).await
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<PaginatedOrders, BackendError> {
        let request = self.http.get(self.url("/orders")).query(query);
        self.send(request).await
    }

    async fn fetch_transitions(&self) -> Result<HashMap<String, Vec<String>>, BackendError> {
        let Some(path) = &self.transitions_path else {
            return Err(BackendError::Unsupported);
        };
        let request = self.http.get(self.url(path));
        self.send(request).await
    }
}
