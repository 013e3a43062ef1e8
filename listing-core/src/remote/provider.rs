//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `listing-provider-sharetribe`) using JSON over stdin/stdout.
//! Each call spawns the provider, writes one request line and reads one
//! response document.
//!
//! Providers own their credentials and marketplace SDK; the editor only
//! sees the typed commands in [`super::protocol`].

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{ListingError, ListingResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider {
    name: String,
    #[serde(skip, default = "default_timeout")]
    timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider {
            name: name.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        format!("listing-provider-{}", self.name)
    }

    fn binary_path(&self) -> ListingResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            ListingError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.name, binary_name
            ))
        })
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> ListingResult<C::Response> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ListingError::ProviderTimeout(self.timeout.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> ListingResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| ListingError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| ListingError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!("Calling {} with {:?}", binary_path.display(), command);

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ListingError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ListingError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(ListingError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Decode a provider's stdout into the command's response type.
pub fn parse_response<R: serde::de::DeserializeOwned>(stdout: &str) -> ListingResult<R> {
    if stdout.trim().is_empty() {
        return Err(ListingError::Provider("Provider returned no response".into()));
    }

    let response: Response<R> = serde_json::from_str(stdout)
        .map_err(|e| ListingError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error, code } => Err(ListingError::remote(code, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::ExceptionId;
    use crate::remote::protocol::DeleteException;

    #[test]
    fn test_binary_name() {
        assert_eq!(Provider::from_name("memory").binary_name(), "listing-provider-memory");
    }

    #[test]
    fn test_parse_response_error_maps_to_remote() {
        let err = parse_response::<()>(r#"{"status":"error","error":"not found","code":404}"#).unwrap_err();
        assert!(matches!(err, ListingError::Remote { status: Some(404), .. }));
    }

    #[test]
    fn test_parse_response_empty_output() {
        let err = parse_response::<()>("  \n").unwrap_err();
        assert!(matches!(err, ListingError::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_provider_binary() {
        let provider = Provider::from_name("definitely-not-installed-3f9a");
        let err = provider
            .call(DeleteException {
                id: ExceptionId::new("exc-1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::ProviderNotInstalled(_)));
    }
}
