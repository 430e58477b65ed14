use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::http::Request;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::types::{InvalidIdentifier, ObjectId};
use crate::http::Error;

/// The `:id` segment of a resource path, parsed as an [`ObjectId`].
///
/// Using `Path<ObjectId>` (or `Path<String>`) directly would let axum answer a segment that
/// isn't valid UTF-8 once percent-decoded with its own plain-text rejection. Here every
/// failure is an `InvalidIdentifier`, so clients always get `{"error": "BadRequest"}`.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub ObjectId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| InvalidIdentifier(rejection.body_text()))?;

        Ok(Self(id.parse()?))
    }
}

/// `axum::extract::Query`, except a malformed query string is a `400` with the usual JSON body.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                log::debug!("malformed query string: {}", rejection.body_text());
                Error::validation_failed("query", "is not a valid query string")
            })?;

        Ok(Self(query))
    }
}

/// The raw JSON body of a write request, decoded but not yet validated.
///
/// We don't use `axum::Json<T>` directly for two reasons:
///
/// * its rejections are plain-text `415`/`422` responses, while existing clients expect every
///   bad payload to be a `400` with `{"error": "BadRequest"}`;
/// * deserializing straight into a typed struct would skip the per-resource rule tables in
///   `validation`, which need to see the fields as the client sent them.
///
/// An empty body is treated as `{}` so e.g. `PUT /users/:id` without a body is a no-op
/// update rather than a malformed request. The `Content-Type` header is not checked.
#[derive(Debug)]
pub struct JsonPayload(pub Value);

#[async_trait]
impl<S, B> FromRequest<S, B> for JsonPayload
where
    Bytes: FromRequest<S, B>,
    B: Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| Error::validation_failed("body", "could not be read"))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Object(Default::default())));
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            log::debug!("request body is not JSON: {}", e);
            Error::validation_failed("body", "is not valid JSON")
        })?;

        Ok(Self(value))
    }
}
