//! Axum edge adapter. Owns the only conversions between axum types and the
//! transport-agnostic pipeline traits, and the only error-to-wire rendering.

use crate::context::{HandlerCx, ProtoRequest, ProtoResponse, RequestContext};
use crate::errors::{self, InterceptError};
use crate::stages::{write_error, Reply, RequestChain};
use axum::response::IntoResponse;
use http::{header::HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use std::future::Future;

const BODY_LIMIT: usize = 1 << 20;

pub struct AxumReq {
    parts: http::request::Parts,
    body: Option<Vec<u8>>,
}

impl ProtoRequest for AxumReq {
    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn path(&self) -> &str {
        self.parts.uri.path()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    fn read_json(&mut self) -> Result<Option<Value>, InterceptError> {
        match &self.body {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(bytes)
                .map(Some)
                .map_err(|_| errors::schema_msg("request body is not valid JSON")),
        }
    }
}

#[derive(Default)]
pub struct AxumRes {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl ProtoResponse for AxumRes {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn insert_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_json(&mut self, body: Value) {
        self.body = Some(body);
    }
}

impl AxumRes {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::Json(self.body.unwrap_or(Value::Null)).into_response();
        *response.status_mut() = StatusCode::from_u16(self.status.unwrap_or(200))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

/// Runs one request through a chain and renders the outcome. Every route
/// handler in the server funnels through here.
pub async fn handle_with_chain<F, Fut>(
    req: axum::extract::Request,
    chain: &RequestChain,
    debug_errors: bool,
    handler: F,
) -> axum::response::Response
where
    F: FnOnce(HandlerCx) -> Fut + Send,
    Fut: Future<Output = Result<Reply, InterceptError>> + Send,
{
    let (parts, body) = req.into_parts();
    let mut cx = RequestContext::new(debug_errors);

    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let err = errors::schema_msg("unable to read request body");
            let mut res = AxumRes::default();
            write_error(&mut res, &err, &cx);
            return res.into_response();
        }
    };

    let mut areq = AxumReq {
        parts,
        body: (!bytes.is_empty()).then(|| bytes.to_vec()),
    };
    let mut ares = AxumRes::default();

    match chain
        .run_with_handler(&mut cx, &mut areq, &mut ares, handler)
        .await
    {
        Ok(()) => ares.into_response(),
        Err(err) => {
            if err.status() >= 500 {
                tracing::error!(request_id = %cx.request_id, audit = ?err.0.to_audit(), "request failed");
            }
            let mut res = AxumRes::default();
            write_error(&mut res, &err, &cx);
            res.into_response()
        }
    }
}
