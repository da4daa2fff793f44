//! HTTP delivery of one build status to one repository endpoint.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, warn};

use bitstatus_core::{BuildStatus, StatusResource};

use crate::credentials::Credentials;
use crate::error::NotifyError;
use crate::log::BuildLog;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Response of one accepted status POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDelivery {
    pub status_code: u16,
    pub body: String,
}

/// Build the HTTP client for one notification invocation.
///
/// Each invocation gets its own client; nothing is shared across builds.
pub fn build_client() -> Result<Client, NotifyError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()
        .map_err(NotifyError::transport)
}

/// POST one status to one resource.
///
/// Basic auth is applied per request from the resolved credentials. The
/// outgoing request and the response status/body are logged for diagnosis;
/// a network failure or non-2xx response is returned as a per-resource
/// transport error and is not retried here.
pub async fn send(
    client: &Client,
    credentials: &Credentials,
    resource: &StatusResource,
    status: &BuildStatus,
    log: &mut dyn BuildLog,
) -> Result<StatusDelivery, NotifyError> {
    let url = resource.post_url();
    let body = serde_json::to_string(status)?;

    debug!(url = %url, body = %body, "posting build status");

    let response = client
        .post(&url)
        .basic_auth(&credentials.username, Some(credentials.secret()))
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(body)
        .send()
        .await
        .map_err(|err| {
            warn!(url = %url, error = %err, "build status request failed");
            log.line(&format!(
                "Sending build status for commit {} failed: {err}",
                resource.commit_id()
            ));
            NotifyError::transport(err)
        })?;

    let status_code = response.status().as_u16();
    let success = response.status().is_success();
    let response_body = response.text().await.unwrap_or_default();

    info!(
        url = %url,
        status_code = status_code,
        body = %response_body,
        "build status response received"
    );

    if !success {
        log.line(&format!(
            "Build status for commit {} was rejected with http status code {status_code}",
            resource.commit_id()
        ));
        return Err(NotifyError::rejected(status_code, &response_body));
    }

    log.line(&format!(
        "Sending build status {} for commit {} to {} is done",
        status.state_label(),
        resource.commit_id(),
        resource.host()
    ));
    log.line(&format!(
        "Sent build status with http status code: {status_code}"
    ));

    Ok(StatusDelivery {
        status_code,
        body: response_body,
    })
}
