/// Defines a common error type to use for all request handlers. Every failure a client can
/// see is a small JSON object with a single `error` token.
mod error;

/// Contains definitions for application-specific parameters to handler functions,
/// such as `JsonPayload` which reads a request body as untyped JSON so it can be checked
/// against a resource's validation rules.
pub mod extractor;

/// A catch-all module for other common types in the API, such as the `ObjectId` identifier
/// codec and the `Timestamptz` wire format.
pub mod types;

/// Declarative per-resource field rules and the one function that evaluates them.
pub mod validation;

// Modules introducing API routes. `tweets` is the whole tweet service; `users` and `follows`
// together make up the user service.
mod follows;
mod tweets;
mod users;

pub mod server;
pub use server::serve;

pub mod api_context;
pub use api_context::ApiContext;

pub use error::{Error, ResultExt};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod test_util;
