//! axum glue for the outermost request boundary

use axum::{
    extract::ConnectInfo,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;

use crate::sanitize::is_stripped;
use crate::taxonomy::ErrorResponse;

const MAX_USER_AGENT_LENGTH: usize = 256;

/// Request facts attached to failure log entries.
///
/// Authorization and cookie headers are never read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Capture context from request parts.
    ///
    /// With `trust_proxy`, the first `X-Forwarded-For` entry wins over the
    /// socket peer address from [`ConnectInfo`].
    pub fn from_parts(parts: &Parts, trust_proxy: bool) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let forwarded = if trust_proxy {
            forwarded_for(&parts.headers)
        } else {
            None
        };

        Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            remote_addr: forwarded.or(peer),
            user_agent: user_agent(&parts.headers),
        }
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// User agent with control characters removed, truncated for log safety
fn user_agent(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::USER_AGENT)?.to_str().ok()?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !is_stripped(*c))
        .take(MAX_USER_AGENT_LENGTH)
        .collect();
    Some(cleaned)
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
