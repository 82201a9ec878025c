//! API key gate middleware.
//!
//! This middleware intercepts every gated request to:
//! 1. Collect parameters from the query string and a form body
//! 2. Evaluate them against the shared [`KeyGate`]
//! 3. Forward the request untouched, or answer with the rendered denial

use std::{future::poll_fn, pin::Pin, sync::Arc};

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{FromRequest, Multipart, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::{
    error::GateError,
    models::{
        decision::{Decision, Denial},
        params::RequestParamMap,
    },
    services::key_gate::KeyGate,
};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Body encodings searched for the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    UrlEncoded,
    Multipart,
}

/// API key gate middleware function.
///
/// # Flow
///
/// 1. Decode query string pairs
/// 2. If the body is an url-encoded or multipart form whose declared
///    `Content-Length` fits the gate's body limit, buffer it, merge its
///    fields over the query pairs and put the same bytes back into the request
/// 3. Evaluate the parameters
/// 4. Allow: call the next handler
/// 5. Deny: return the denial rendered in the gate's content type
///
/// A body declared larger than the limit is left unread, so the key must come
/// from the query string. A body that overruns the limit without declaring it,
/// or breaks off mid-read, is answered with 413 or 400.
///
/// # Usage
///
/// ```ignore
/// let gate = Arc::new(KeyGate::new(["abc123"]));
/// let app = Router::new()
///     .route("/api/v1/echo", get(handlers::echo::echo))
///     .route_layer(axum_middleware::from_fn_with_state(gate, api_key_middleware));
/// ```
pub async fn api_key_middleware(
    State(gate): State<Arc<KeyGate>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let (params, request) = match collect_params(request, gate.body_limit()).await {
        Ok(collected) => collected,
        Err(err) => {
            tracing::warn!(%path, reason = %err, "Form body rejected");
            return Denial::from(err).render(gate.content_type());
        }
    };

    match gate.evaluate(&params) {
        Decision::Allow => {
            tracing::debug!(%path, "API key accepted");
            next.run(request).await
        }
        Decision::Deny(denial) => {
            if denial.status.is_server_error() {
                tracing::error!(%path, reason = %denial.detail, "API key gate misconfigured");
            } else {
                tracing::warn!(
                    %path,
                    parameter = gate.parameter_name(),
                    reason = %denial.detail,
                    "Request denied"
                );
            }
            denial.render(gate.content_type())
        }
    }
}

/// Gather query and form parameters, returning the request with its body intact.
///
/// # Errors
///
/// - `BodyTooLarge`: the body passed `body_limit` without declaring its length
/// - `BodyUnreadable`: the body stream failed part-way
async fn collect_params(
    request: Request,
    body_limit: usize,
) -> Result<(RequestParamMap, Request), GateError> {
    let mut params = RequestParamMap::from_query(request.uri().query());

    let Some(kind) = form_kind(request.headers()) else {
        return Ok((params, request));
    };

    if declared_length(request.headers()).is_some_and(|len| len > body_limit as u64) {
        tracing::debug!(body_limit, "Form body over limit, left unread");
        return Ok((params, request));
    }

    let (parts, body) = request.into_parts();
    let bytes = read_body(body, body_limit).await?;

    match kind {
        FormKind::UrlEncoded => params.merge_form(&bytes),
        FormKind::Multipart => {
            params.merge_pairs(multipart_text_fields(&parts.headers, bytes.clone()).await)
        }
    }

    Ok((params, Request::from_parts(parts, Body::from(bytes))))
}

/// Buffer a body, failing once more than `limit` bytes have arrived.
async fn read_body(mut body: Body, limit: usize) -> Result<Bytes, GateError> {
    let mut buf = Vec::new();

    while let Some(frame) = poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
        let frame = frame.map_err(|err| {
            tracing::warn!(error = %err, "Failed to read form body");
            GateError::BodyUnreadable
        })?;

        // Trailers carry no form fields.
        let Ok(data) = frame.into_data() else {
            continue;
        };

        if buf.len() + data.len() > limit {
            return Err(GateError::BodyTooLarge);
        }
        buf.extend_from_slice(&data);
    }

    Ok(Bytes::from(buf))
}

/// Text fields of a buffered multipart body. File parts are skipped.
///
/// A malformed body yields whatever fields parsed before the error; the
/// downstream handler still gets the original bytes to reject as it sees fit.
async fn multipart_text_fields(headers: &HeaderMap, bytes: Bytes) -> Vec<(String, String)> {
    let mut request = Request::new(Body::from(bytes));
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(err) => {
            tracing::debug!(error = %err, "Unparseable multipart body");
            return Vec::new();
        }
    };

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.text().await {
            Ok(value) => fields.push((name, value)),
            Err(_) => break,
        }
    }
    fields
}

fn form_kind(headers: &HeaderMap) -> Option<FormKind> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())?
        .trim();

    if mime.eq_ignore_ascii_case(FORM_URLENCODED) {
        Some(FormKind::UrlEncoded)
    } else if mime.eq_ignore_ascii_case(MULTIPART_FORM_DATA) {
        Some(FormKind::Multipart)
    } else {
        None
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::RequestParams;
    use axum::http::HeaderValue;

    const MULTIPART_BODY: &str = "--XYZ\r\n\
        Content-Disposition: form-data; name=\"api_key\"\r\n\r\n\
        abc123\r\n\
        --XYZ\r\n\
        Content-Disposition: form-data; name=\"note\"; filename=\"note.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        file contents\r\n\
        --XYZ--\r\n";

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    fn form_request(uri: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM_URLENCODED)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(request: Request) -> Bytes {
        axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[test]
    fn recognises_form_content_types() {
        assert_eq!(
            form_kind(&headers("application/x-www-form-urlencoded")),
            Some(FormKind::UrlEncoded)
        );
        assert_eq!(
            form_kind(&headers("application/x-www-form-urlencoded; charset=UTF-8")),
            Some(FormKind::UrlEncoded)
        );
        assert_eq!(
            form_kind(&headers("multipart/form-data; boundary=x")),
            Some(FormKind::Multipart)
        );
        assert_eq!(form_kind(&headers("application/json")), None);
        assert_eq!(form_kind(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn form_body_is_restored() {
        let request = form_request("/?api_key=query", "api_key=form&name=x");

        let (params, request) = collect_params(request, 1024).await.unwrap();

        assert_eq!(params.param("api_key"), Some("form"));
        assert_eq!(&body_bytes(request).await[..], b"api_key=form&name=x");
    }

    #[tokio::test]
    async fn declared_oversized_body_is_left_unread() {
        let mut request = form_request("/?api_key=query", "api_key=form&padding=0123456789");
        request
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("31"));

        let (params, request) = collect_params(request, 8).await.unwrap();

        assert_eq!(params.param("api_key"), Some("query"));
        assert_eq!(
            &body_bytes(request).await[..],
            b"api_key=form&padding=0123456789"
        );
    }

    #[tokio::test]
    async fn undeclared_oversized_body_is_rejected() {
        let request = form_request("/?api_key=query", "api_key=form&padding=0123456789");

        let result = collect_params(request, 8).await;

        assert_eq!(result.err(), Some(GateError::BodyTooLarge));
    }

    #[tokio::test]
    async fn multipart_text_fields_are_read_and_body_restored() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from(MULTIPART_BODY))
            .unwrap();

        let (params, request) = collect_params(request, 1024).await.unwrap();

        assert_eq!(params.param("api_key"), Some("abc123"));
        assert_eq!(params.param("note"), None);
        assert_eq!(&body_bytes(request).await[..], MULTIPART_BODY.as_bytes());
    }

    #[tokio::test]
    async fn malformed_multipart_contributes_nothing() {
        let request = axum::http::Request::builder()
            .uri("/?api_key=query")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from("not multipart at all"))
            .unwrap();

        let (params, request) = collect_params(request, 1024).await.unwrap();

        assert_eq!(params.param("api_key"), Some("query"));
        assert_eq!(&body_bytes(request).await[..], b"not multipart at all");
    }
}
