use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::error::DatabaseError;

use crate::http::types::InvalidIdentifier;
use crate::http::validation::Violation;

/// A common error type that can be used throughout the API.
///
/// Can be returned in a `Result` from an API handler function.
///
/// For convenience, this represents both API errors as well as internal recoverable errors,
/// and maps them to the small fixed set of status codes and `{"error": ...}` bodies that
/// existing clients of these services expect.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Return `400 Bad Request` for an identifier that is not 24 hex characters.
    ///
    /// The store is never consulted for these.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Return `400 Bad Request` for a payload that fails its resource's validation rules.
    ///
    /// The individual violations are logged but deliberately not sent to the client;
    /// existing clients only understand the bare `BadRequest` token.
    #[error("request payload failed validation")]
    ValidationFailed(Vec<Violation>),

    /// Return `404 Not Found`
    #[error("resource not found")]
    NotFound,

    /// Automatically return `500 Internal Server Error` on a `sqlx::Error`.
    ///
    /// Via the generated `From<sqlx::Error> for Error` impl,
    /// this allows using `?` on database calls in handler functions without a manual mapping step.
    ///
    /// The actual error message isn't returned to the client for security reasons.
    /// It should be logged instead.
    ///
    /// Note that this could also contain database constraint errors, which should usually
    /// be transformed into client errors (e.g. `400 Bad Request`).
    /// See `ResultExt` below for a convenient way to do this.
    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    /// Return `500 Internal Server Error` on a `anyhow::Error`.
    ///
    /// Catch-all for unexpected failures that aren't database errors. Nothing in the handlers
    /// produces one today.
    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

/// The only error body clients ever see.
#[derive(serde::Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl Error {
    /// Convenient constructor for `Error::ValidationFailed` with a single violation.
    pub fn validation_failed(field: &'static str, reason: &'static str) -> Self {
        Self::ValidationFailed(vec![Violation { field, reason }])
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Sqlx(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) | Self::ValidationFailed(_) => "BadRequest",
            Self::NotFound => "NotFound",
            Self::Sqlx(_) | Self::Anyhow(_) => "InternalServerError",
        }
    }
}

/// Axum allows you to return `Result` from handler functions, but the error type
/// also must be some sort of response type.
///
/// The generated `Display` impl only goes to the logs; the client gets `{"error": "<token>"}`.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidIdentifier(e) => {
                log::debug!("rejected request: {}", e);
            }
            Self::ValidationFailed(violations) => {
                log::debug!("rejected payload: {:?}", violations);
            }

            // Other errors get mapped normally.
            Self::Sqlx(e) => {
                // TODO: we probably want to use `tracing` instead
                // so that this gets linked to the HTTP request by `TraceLayer`.
                log::error!("SQLx error: {:?}", e);
            }

            Self::Anyhow(e) => {
                log::error!("Generic error: {:?}", e);
            }

            Self::NotFound => (),
        }

        (
            self.status_code(),
            Json(ErrorBody {
                error: self.token(),
            }),
        )
            .into_response()
    }
}

/// A little helper trait for more easily converting database constraint errors into API errors.
///
/// ```rust,ignore
/// let tweet = sqlx::query_as::<_, Tweet>("insert into tweet ...")
///     .fetch_one(&pool)
///     .await
///     .on_constraint("tweet_content_not_blank", |_| {
///         Error::validation_failed("content", "must not be blank")
///     })?;
/// ```
///
/// Something like this would ideally live in a `sqlx-axum` crate if it made sense to author one,
/// however its definition is tied pretty intimately to the `Error` type, which is itself
/// tied directly to application semantics.
pub trait ResultExt<T> {
    /// If `self` contains a SQLx database constraint error with the given name,
    /// transform the error.
    ///
    /// Otherwise, the result is passed through unchanged.
    fn on_constraint(
        self,
        name: &str,
        f: impl FnOnce(Box<dyn DatabaseError>) -> Error,
    ) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn on_constraint(
        self,
        name: &str,
        map_err: impl FnOnce(Box<dyn DatabaseError>) -> Error,
    ) -> Result<T, Error> {
        self.map_err(|e| match e.into() {
            Error::Sqlx(sqlx::Error::Database(dbe)) if dbe.constraint() == Some(name) => {
                map_err(dbe)
            }
            e => e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    async fn render(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[rstest]
    #[case::invalid_identifier(
        Error::InvalidIdentifier(InvalidIdentifier("invalid".into())),
        StatusCode::BAD_REQUEST,
        json!({"error": "BadRequest"})
    )]
    #[case::validation_failed(
        Error::validation_failed("content", "too long"),
        StatusCode::BAD_REQUEST,
        json!({"error": "BadRequest"})
    )]
    #[case::not_found(Error::NotFound, StatusCode::NOT_FOUND, json!({"error": "NotFound"}))]
    #[case::store_failure(
        Error::Sqlx(sqlx::Error::PoolTimedOut),
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "InternalServerError"})
    )]
    #[case::unexpected(
        Error::Anyhow(anyhow::anyhow!("boom")),
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "InternalServerError"})
    )]
    #[tokio::test]
    async fn maps_outcomes_to_fixed_responses(
        #[case] error: Error,
        #[case] status: StatusCode,
        #[case] body: Value,
    ) {
        assert_eq!(render(error).await, (status, body));
    }

    #[tokio::test]
    async fn internal_details_are_not_exposed() {
        let (_, body) = render(Error::Anyhow(anyhow::anyhow!("password=hunter2"))).await;
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn on_constraint_passes_through_other_errors() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let mapped = result.on_constraint("user_name_not_blank", |_| Error::NotFound);
        assert!(matches!(mapped, Err(Error::Sqlx(sqlx::Error::RowNotFound))));
    }
}
