// Thin POST helper shared by the API clients.
// It only builds and sends the request: the response comes back untouched,
// and callers decide what a non-success status means.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Replacement body for a POST that should not be sent as JSON.
#[allow(dead_code)]
pub enum PostBody {
    Multipart(Form),
    Bytes(Vec<u8>),
}

/// Per-request overrides. Anything left as None keeps the JSON defaults.
#[derive(Default)]
pub struct PostOverrides {
    /// Replaces the default `Content-Type: application/json` header.
    pub headers: Option<HeaderMap>,
    /// Replaces the JSON-encoded body.
    pub body: Option<PostBody>,
}

impl PostOverrides {
    /// Send a multipart form instead of JSON, letting reqwest pick the
    /// content type and boundary.
    pub fn multipart(form: Form) -> Self {
        Self {
            headers: None,
            body: Some(PostBody::Multipart(form)),
        }
    }
}

/// Build a POST without sending it.
pub fn build_post<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &T,
    overrides: Option<PostOverrides>,
) -> Result<RequestBuilder, HttpError> {
    let PostOverrides {
        headers,
        body: body_override,
    } = overrides.unwrap_or_default();

    let mut request = client.post(url);

    request = match body_override {
        Some(PostBody::Multipart(form)) => request.multipart(form),
        Some(PostBody::Bytes(bytes)) => request.body(bytes),
        None => {
            let json = serde_json::to_vec(body)?;
            if headers.is_none() {
                request = request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            request.body(json)
        }
    };

    if let Some(headers) = headers {
        request = request.headers(headers);
    }

    Ok(request)
}

/// POST `body` as JSON to `url` and hand back the raw response.
pub async fn post<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &T,
    overrides: Option<PostOverrides>,
) -> Result<Response, HttpError> {
    let request = build_post(client, url, body, overrides)?;
    tracing::debug!(url, "POST");
    Ok(request.send().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    fn body_json(request: &reqwest::Request) -> serde_json::Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn posts_json_by_default() {
        let client = Client::new();
        let request = build_post(
            &client,
            "http://localhost:3030/1/welcome",
            &json!({ "enabled": true }),
            None,
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:3030/1/welcome");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(&request), json!({ "enabled": true }));
    }

    #[test]
    fn header_override_replaces_the_defaults() {
        let client = Client::new();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let request = build_post(
            &client,
            "http://localhost/x",
            "plain",
            Some(PostOverrides {
                headers: Some(headers),
                body: None,
            }),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn multipart_override_replaces_body_and_content_type() {
        let client = Client::new();
        let form = Form::new().text("join.image", "data");

        let request = build_post(
            &client,
            "http://localhost/x/images",
            &(),
            Some(PostOverrides::multipart(form)),
        )
        .unwrap()
        .build()
        .unwrap();

        let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn bytes_override_is_sent_verbatim() {
        let client = Client::new();
        let request = build_post(
            &client,
            "http://localhost/x",
            &json!({ "ignored": true }),
            Some(PostOverrides {
                headers: None,
                body: Some(PostBody::Bytes(b"raw".to_vec())),
            }),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"raw"[..]));
        assert!(request.headers().get(CONTENT_TYPE).is_none());
    }
}
