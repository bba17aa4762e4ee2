// File: ./src/client/middleware.rs
//! Tower middleware that decorates outgoing requests (User-Agent, bearer token).
use http::{HeaderValue, Request, header};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug)]
pub struct UserAgentLayer {
    pub user_agent: String,
}

impl UserAgentLayer {
    pub fn new(user_agent: String) -> Self {
        Self { user_agent }
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UserAgentService<S> {
    inner: S,
    user_agent: String,
}

impl<S, ReqBody> Service<Request<ReqBody>> for UserAgentService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if let Ok(val) = HeaderValue::from_str(&self.user_agent) {
            req.headers_mut().insert(header::USER_AGENT, val);
        }
        self.inner.call(req)
    }
}

/// Adds `Authorization: Bearer <token>` when a session token is present.
#[derive(Clone, Debug, Default)]
pub struct BearerAuthLayer {
    header: Option<HeaderValue>,
}

impl BearerAuthLayer {
    /// Tokens that cannot be a header value are dropped, so the request
    /// goes out unauthenticated and the server answers 401.
    pub fn new(token: Option<&str>) -> Self {
        let header = token.and_then(|t| {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", t)).ok()?;
            value.set_sensitive(true);
            Some(value)
        });
        if token.is_some() && header.is_none() {
            log::warn!("Session token contains invalid header characters; sending without it");
        }
        Self { header }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            header: self.header.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BearerAuthService<S> {
    inner: S,
    header: Option<HeaderValue>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BearerAuthService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if let Some(val) = &self.header {
            req.headers_mut().insert(header::AUTHORIZATION, val.clone());
        }
        self.inner.call(req)
    }
}
