// src/error.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! The one remote failure kind: a service error code plus its message.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Failure of a single remote storage call.
///
/// Every S3 call in this crate reports through this type; call sites print
/// it and carry on, so a failed call never aborts the process. A pagination
/// failure ends only the remaining pages of that listing.
#[derive(Debug, Error)]
#[error("{name} - {message}")]
pub struct RemoteCallError {
    /// Service error code (e.g. `NoSuchBucket`), or a coarse category when
    /// the failure never reached the service.
    pub name: String,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build from any SDK error, preferring the service's own error
    /// metadata and falling back to the rendered error chain (dispatch
    /// failures, timeouts and the like carry no metadata).
    pub fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let name = err.code().unwrap_or("SdkError").to_owned();
        let message = err.message().map(str::to_owned);
        let message = match message {
            Some(m) => m,
            None => DisplayErrorContext(err).to_string(),
        };
        Self { name, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_name_and_message() {
        let err = RemoteCallError::new("NoSuchBucket", "the bucket does not exist");
        assert_eq!(err.to_string(), "NoSuchBucket - the bucket does not exist");
    }
}
