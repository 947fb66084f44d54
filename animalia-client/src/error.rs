use crate::{
    alert::{Action, Alert},
    overlay::OverlayError,
    token_store::TokenStoreError,
};
use animalia_common::model::ModelValidationError;
use reqwest::StatusCode;
use std::io;
use thiserror::Error;
use tracing::error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to {path} failed: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("Response from {path} did not match the expected shape: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Server rejected the request: {0}")]
    Rejected(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Comment content was empty")]
    EmptyComment,
    #[error("Reading image {path} failed: {source}")]
    Image {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Image {file_name} has an unusable content type {mime_type}: {source}")]
    ImageType {
        file_name: String,
        mime_type: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Model(#[from] ModelValidationError),
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl ClientError {
    /// The HTTP status the server answered with, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network { source, .. } => source.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::NotSignedIn)
            || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Logs the error and returns the static message to show for the failed `action`.
    pub fn alert(&self, action: Action) -> Alert {
        error!(error = %self, ?action, "Action failed");

        match self {
            ClientError::EmptyComment => Alert {
                title: "Error",
                message: "Comments need at least one character.",
            },
            ClientError::NotSignedIn => Alert {
                title: "Error",
                message: "Could not load your account. Please sign in again.",
            },
            _ => action.alert(),
        }
    }
}
