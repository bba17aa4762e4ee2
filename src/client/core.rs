// File: src/client/core.rs
use crate::client::error::ApiError;
use crate::client::middleware::{BearerAuthLayer, UserAgentLayer};
use crate::config::Config;
use crate::model::{
    Category, CategoryFilter, CategoryId, CreateCategoryRequest, CreateEventRequest, Event,
    EventFilter, EventId, LoginRequest, LoginResponse, MessageResponse, Page, RegisterRequest,
    TokenResponse, TransitionRequest, UpdateCategoryRequest, UpdateEventRequest,
    UpdateUserRequest, User, UserId,
};
use crate::session::Session;

use http::{Method, Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tower::{ServiceBuilder, ServiceExt};
use url::Url;

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn user_agent() -> String {
    format!("eventdesk/{}", env!("CARGO_PKG_VERSION"))
}

/// JSON-over-HTTP client for the event backend.
///
/// Cheap to clone. The bearer token is fixed per instance; build a new one
/// with [`ApiClient::with_token`] after signing in or out.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    http: HttpsClient,
    token: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("'{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            log::warn!("Skipping unreadable system certificate: {}", err);
        }
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            log::warn!("No valid system certificates found; HTTPS requests will fail.");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self {
            base,
            http,
            token: token.map(str::to_string),
            timeout,
        })
    }

    /// Client for the configured backend, authenticated as the session's user.
    pub fn from_config(config: &Config, session: &Session) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url(),
            session.bearer(),
            config.request_timeout(),
        )
    }

    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Uri, ApiError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest(self.base.to_string()))?;
            segments.pop_if_empty();
            for part in path.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url.as_str()
            .parse::<Uri>()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<Vec<u8>, ApiError> {
        let uri = self.endpoint(path, query)?;
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.unwrap_or_default())
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let service = ServiceBuilder::new()
            .layer(UserAgentLayer::new(user_agent()))
            .layer(BearerAuthLayer::new(self.token.as_deref()))
            .service(self.http.clone());

        let response = match tokio::time::timeout(self.timeout, service.oneshot(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::error!("Network error on {} {}: {}", method, path, e);
                return Err(ApiError::Network(e.to_string()));
            }
            Err(_) => {
                log::error!("{} {} timed out after {:?}", method, path, self.timeout);
                return Err(ApiError::Timeout(self.timeout));
            }
        };

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?
            .to_bytes()
            .to_vec();

        if status.is_success() {
            return Ok(bytes);
        }

        let err = ApiError::from_response(status, &bytes);
        match status.as_u16() {
            401 => log::warn!("{} {}: unauthorized", method, path),
            403 => log::error!("{} {}: access forbidden", method, path),
            404 => log::error!("{} {}: resource not found", method, path),
            500..=599 => log::error!("{} {}: server error {}", method, path, status),
            _ => log::error!("{} {}: API error {}: {}", method, path, status, err),
        }
        Err(err)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(method, path, query, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn json<B: Serialize>(body: &B) -> Result<Option<String>, ApiError> {
        serde_json::to_string(body)
            .map(Some)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    fn tz_query(timezone: &str) -> Vec<(&'static str, String)> {
        if timezone.is_empty() {
            Vec::new()
        } else {
            vec![("timezone", timezone.to_string())]
        }
    }

    // --- AUTH ---

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, "/users/login", &[], Self::json(credentials)?)
            .await
    }

    pub async fn register(&self, data: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, "/users/register", &[], Self::json(data)?)
            .await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(Method::POST, "/auth/logout", &[], None).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send(Method::GET, "/auth/me", &[], None).await
    }

    pub async fn refresh_token(&self) -> Result<TokenResponse, ApiError> {
        self.send(Method::POST, "/auth/refresh", &[], None).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = serde_json::json!({ "email": email });
        self.send(Method::POST, "/users/forgot-password", &[], Self::json(&body)?)
            .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = serde_json::json!({ "token": token, "password": password });
        self.send(Method::POST, "/users/reset-password", &[], Self::json(&body)?)
            .await
    }

    // --- EVENTS ---

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Page<Event>, ApiError> {
        self.send(Method::GET, "/events", &filter.query_pairs(), None)
            .await
    }

    pub async fn get_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        self.send(
            Method::GET,
            &format!("/events/{}", id),
            &Self::tz_query(timezone),
            None,
        )
        .await
    }

    pub async fn create_event(
        &self,
        data: &CreateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        self.send(
            Method::POST,
            "/events",
            &Self::tz_query(timezone),
            Self::json(data)?,
        )
        .await
    }

    pub async fn update_event(
        &self,
        id: EventId,
        data: &UpdateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        self.send(
            Method::PATCH,
            &format!("/events/{}", id),
            &Self::tz_query(timezone),
            Self::json(data)?,
        )
        .await
    }

    pub async fn delete_event(&self, id: EventId) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/events/{}", id), &[], None)
            .await?;
        Ok(())
    }

    pub async fn start_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        let body = TransitionRequest::in_zone(timezone);
        self.send(
            Method::POST,
            &format!("/events/{}/start", id),
            &[],
            Self::json(&body)?,
        )
        .await
    }

    pub async fn stop_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        let body = TransitionRequest::in_zone(timezone);
        self.send(
            Method::POST,
            &format!("/events/{}/stop", id),
            &[],
            Self::json(&body)?,
        )
        .await
    }

    // --- CATEGORIES ---

    pub async fn list_categories(
        &self,
        filter: &CategoryFilter,
    ) -> Result<Page<Category>, ApiError> {
        self.send(Method::GET, "/categories", &filter.query_pairs(), None)
            .await
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.send(Method::GET, &format!("/categories/{}", id), &[], None)
            .await
    }

    pub async fn create_category(
        &self,
        data: &CreateCategoryRequest,
    ) -> Result<Category, ApiError> {
        self.send(Method::POST, "/categories", &[], Self::json(data)?)
            .await
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        data: &UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        self.send(
            Method::PATCH,
            &format!("/categories/{}", id),
            &[],
            Self::json(data)?,
        )
        .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/categories/{}", id), &[], None)
            .await?;
        Ok(())
    }

    // --- USERS ---

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send(Method::GET, "/users", &[], None).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.send(Method::GET, &format!("/users/{}", id), &[], None)
            .await
    }

    pub async fn update_user(&self, id: UserId, data: &UpdateUserRequest) -> Result<User, ApiError> {
        self.send(
            Method::PATCH,
            &format!("/users/{}", id),
            &[],
            Self::json(data)?,
        )
        .await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/users/{}", id), &[], None)
            .await?;
        Ok(())
    }
}
