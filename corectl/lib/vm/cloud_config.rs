use std::path::PathBuf;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{CorectlError, CorectlResult, HostContext};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Where the guest's cloud-config comes from.
///
/// A remote cloud-config is handed to the guest as a `cloud-config-url=` kernel parameter. A local
/// one is copied into the run directory and side-loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "location", content = "source", rename_all = "lowercase")]
pub enum CloudConfig {
    /// A file on the host, stored as an absolute path.
    Local(PathBuf),

    /// A URL that answered a preflight GET with `200 OK`.
    Remote(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CloudConfig {
    /// Classifies `source` as a remote URL or a local file.
    ///
    /// `source` is fetched once; a `200 OK` answer makes it remote. Anything else, including
    /// `source` not being a URL at all, makes corectl look for a file at `source` relative to the
    /// invocation directory.
    pub async fn resolve(source: &str, ctx: &HostContext) -> CorectlResult<Self> {
        Self::resolve_with(&Client::new(), source, ctx).await
    }

    /// Like [`CloudConfig::resolve`], but issues the preflight GET through `client`.
    pub async fn resolve_with(
        client: &Client,
        source: &str,
        ctx: &HostContext,
    ) -> CorectlResult<Self> {
        match client.get(source).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!("cloud-config {} is remote", source);
                return Ok(Self::Remote(source.to_string()));
            }
            Ok(response) => {
                tracing::debug!("cloud-config {} answered {}", source, response.status());
            }
            Err(e) => {
                tracing::debug!("cloud-config {} is not fetchable: {}", source, e);
            }
        }

        let path = ctx.resolve(source);
        tokio::fs::metadata(&path)
            .await
            .map_err(|e| CorectlError::CloudConfigNotFound(source.to_string(), e))?;

        tracing::debug!("cloud-config {} is local", path.display());
        Ok(Self::Local(path))
    }

    /// Returns the URL if the cloud-config is remote.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Self::Remote(url) => Some(url),
            Self::Local(_) => None,
        }
    }

    /// Returns the path if the cloud-config is local.
    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
