//! SOAP client for the partner login and metadata APIs
//!
//! Login posts to `https://<endpoint>/services/Soap/u/<apiVersion>`; every
//! later call goes to the `metadataServerUrl` from the login result with a
//! `SessionHeader`. Archives travel base64-encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use tracing::debug;

use super::envelope;
use super::{
    Connector, DeployJob, DeployStatus, JobId, MetadataApi, RetrieveRequest, RetrieveStatus,
    ServiceTarget,
};
use crate::error::{Result, SpmError};

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("spm/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Send one SOAP request; a fault or non-2xx status becomes `Err(reason)`
fn call(client: &Client, url: &str, action: &str, body: String) -> std::result::Result<String, String> {
    debug!("POST {url} ({action})");
    let response = client
        .post(url)
        .header("Content-Type", "text/xml; charset=UTF-8")
        .header("SOAPAction", action)
        .body(body)
        .send()
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let text = response.text().map_err(|e| e.to_string())?;
    if let Some(fault) = envelope::fault(&text) {
        return Err(fault);
    }
    if !status.is_success() {
        return Err(format!("HTTP {status}"));
    }
    Ok(text)
}

/// Logs in over SOAP and hands out [`SoapSession`]s
#[derive(Debug, Clone)]
pub struct SoapConnector {
    client: Client,
    /// Replaces `https://<endpoint>` when set
    base_url: Option<String>,
}

impl SoapConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: None,
        })
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn login_url(&self, target: &ServiceTarget) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", target.endpoint));
        format!(
            "{}/services/Soap/u/{}",
            base.trim_end_matches('/'),
            target.api_version
        )
    }
}

impl Connector for SoapConnector {
    fn connect(&self, target: &ServiceTarget) -> Result<Box<dyn MetadataApi>> {
        let auth_failed = |reason: String| SpmError::AuthFailed {
            endpoint: target.endpoint.clone(),
            reason,
        };
        let body = envelope::login(&target.credentials.username, &target.credentials.password);
        let response = call(&self.client, &self.login_url(target), "login", body)
            .map_err(auth_failed)?;

        let session_id = envelope::extract(&response, "sessionId")
            .ok_or_else(|| auth_failed("login response has no sessionId".to_string()))?;
        let server_url = envelope::extract(&response, "metadataServerUrl")
            .ok_or_else(|| auth_failed("login response has no metadataServerUrl".to_string()))?;
        debug!("logged in as {}", target.credentials.username);

        Ok(Box::new(SoapSession {
            client: self.client.clone(),
            server_url,
            session_id,
        }))
    }
}

/// An authenticated metadata API session
#[derive(Debug)]
pub struct SoapSession {
    client: Client,
    server_url: String,
    session_id: String,
}

impl SoapSession {
    fn call(&self, action: &str, body: String) -> std::result::Result<String, String> {
        call(&self.client, &self.server_url, action, body)
    }
}

fn problems(body: &str) -> Vec<String> {
    let mut errors = envelope::extract_all(body, "errorMessage");
    errors.extend(envelope::extract_all(body, "problem"));
    errors
}

impl MetadataApi for SoapSession {
    fn submit_deploy(&self, archive: &[u8]) -> Result<DeployJob> {
        let body = envelope::deploy(&self.session_id, &STANDARD.encode(archive));
        let response = self
            .call("deploy", body)
            .map_err(|reason| SpmError::DeploySubmitFailed { reason })?;
        let id = envelope::extract(&response, "id").ok_or_else(|| SpmError::DeploySubmitFailed {
            reason: "deploy response has no job id".to_string(),
        })?;
        debug!("deploy job {id} submitted");
        Ok(DeployJob::new(id))
    }

    fn check_deploy_status(&self, job: &JobId) -> Result<DeployStatus> {
        let body = envelope::check_deploy_status(&self.session_id, &job.0);
        let response = self
            .call("checkDeployStatus", body)
            .map_err(|reason| SpmError::DeployStatusFailed { reason })?;

        // Component results carry their own <success>; the job-level one is last
        let success = match envelope::extract(&response, "status") {
            Some(status) => status.starts_with("Succeeded"),
            None => envelope::extract_all(&response, "success")
                .last()
                .is_some_and(|v| v == "true"),
        };
        Ok(DeployStatus {
            done: envelope::extract_flag(&response, "done"),
            success,
            errors: problems(&response),
        })
    }

    fn submit_retrieve(&self, request: &RetrieveRequest) -> Result<JobId> {
        let body = envelope::retrieve(&self.session_id, request);
        let response = self
            .call("retrieve", body)
            .map_err(|reason| SpmError::RetrieveFailed { reason })?;
        envelope::extract(&response, "id")
            .map(JobId)
            .ok_or_else(|| SpmError::RetrieveFailed {
                reason: "retrieve response has no job id".to_string(),
            })
    }

    fn check_retrieve_status(&self, job: &JobId) -> Result<RetrieveStatus> {
        let body = envelope::check_retrieve_status(&self.session_id, &job.0);
        let response = self
            .call("checkRetrieveStatus", body)
            .map_err(|reason| SpmError::RetrieveFailed { reason })?;

        let archive = match envelope::extract(&response, "zipFile") {
            Some(encoded) => {
                let compact: String = encoded.split_whitespace().collect();
                Some(STANDARD.decode(compact).map_err(|e| SpmError::RetrieveFailed {
                    reason: format!("invalid zipFile encoding: {e}"),
                })?)
            }
            None => None,
        };
        Ok(RetrieveStatus {
            done: envelope::extract_flag(&response, "done"),
            archive,
            errors: problems(&response),
        })
    }
}
