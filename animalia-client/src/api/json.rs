use crate::error::{ClientError, Result};
use serde::de::DeserializeOwned;

/// Decodes a response body. Shape mismatches are reported as [`ClientError::Decode`].
pub(crate) fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| ClientError::Decode {
        path: path.to_owned(),
        source,
    })
}
