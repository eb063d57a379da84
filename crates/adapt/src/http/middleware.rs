// crates/adapt/src/http/middleware.rs

//! Tower middleware stamping the site's security headers on every response.
//!
//! The CMS origin is allowed to frame the site (its preview pane embeds it)
//! and to serve images, so the policy is built from settings once at start.

use axum::{body::Body, http::Request, response::Response};
use domain::setting::SecuritySettings;
use futures::future::BoxFuture;
use http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
};
use http::{HeaderName, HeaderValue};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
const HSTS: &str = "max-age=63072000; includeSubDomains; preload";

// ─────────────────────────────────────────────────────────────────────────────
// Policy
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    headers: Vec<(HeaderName, HeaderValue)>,
}

/// `Content-Security-Policy` value for a CMS origin.
pub fn content_security_policy(cms_origin: &str, settings: &SecuritySettings) -> String {
    let eval = if settings.production { "" } else { " 'unsafe-eval'" };
    let mut connect = vec!["'self'".to_string(), cms_origin.to_string()];
    connect.extend(settings.extra_connect_src.iter().cloned());
    [
        "default-src 'self'".to_string(),
        format!("img-src 'self' data: https: {cms_origin}"),
        format!("script-src 'self' 'unsafe-inline'{eval}"),
        "style-src 'self' 'unsafe-inline'".to_string(),
        format!("connect-src {}", connect.join(" ")),
        "font-src 'self' data:".to_string(),
        format!("frame-ancestors 'self' {cms_origin}"),
    ]
    .join("; ")
}

impl SecurityPolicy {
    #[tracing::instrument(skip_all)]
    pub fn new(cms_origin: &str, settings: &SecuritySettings) -> Self {
        let mut headers = vec![
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (
                REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ),
            (
                PERMISSIONS_POLICY,
                HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
            ),
        ];
        match HeaderValue::from_str(&content_security_policy(cms_origin, settings)) {
            Ok(csp) => headers.push((CONTENT_SECURITY_POLICY, csp)),
            Err(e) => warn!(error = %e, "CSP is not a valid header value; omitted"),
        }
        if settings.production {
            headers.push((STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS)));
        }
        SecurityPolicy { headers }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SecurityHeadersLayer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SecurityHeadersLayer {
    policy: Arc<SecurityPolicy>,
}

impl SecurityHeadersLayer {
    pub fn new(policy: SecurityPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            policy: self.policy.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SecurityHeaders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SecurityHeaders<S> {
    inner: S,
    policy: Arc<SecurityPolicy>,
}

impl<S> Service<Request<Body>> for SecurityHeaders<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // The clone may not be ready; swap so the ready one serves this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let policy = self.policy.clone();

        Box::pin(async move {
            let mut resp = inner.call(req).await?;
            let headers = resp.headers_mut();
            for (name, value) in &policy.headers {
                headers.insert(name.clone(), value.clone());
            }
            Ok(resp)
        })
    }
}
