//! Deadline-enforced JSON retrieval
//!
//! One request in, one parsed body out. The deadline covers the whole
//! exchange including body download and decode. Pacing between calls
//! is deliberately not handled here: each adapter imposes its own
//! inter-call delay policy.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// Send a prepared request and parse the JSON body.
///
/// Fails with [`FetchError::Timeout`] if the exchange does not complete
/// within `deadline`, [`FetchError::HttpStatus`] on a non-success
/// status, and [`FetchError::Malformed`] if the body does not decode
/// into `T`.
pub async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    deadline: Duration,
) -> Result<T, FetchError> {
    let exchange = async {
        let response = request.send().await.map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| FetchError::Malformed(err.to_string()))
    };

    tokio::time::timeout(deadline, exchange)
        .await
        .map_err(|_| FetchError::Timeout)?
}
