//! Report store selection from a URL.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors raised while selecting or opening the report store.
#[derive(Debug, Error)]
pub enum StoreConfigError {
    #[error("invalid report store URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported report store scheme '{0}' (expected file, memory or s3)")]
    UnsupportedScheme(String),

    #[error("cannot prepare report directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open report store: {0}")]
    Backend(#[from] object_store::Error),
}

/// Where generated reports are written.
///
/// ```text
/// file:///var/lib/link-shortener/exports
/// memory://
/// s3://my-bucket/reports?region=eu-west-1
/// ```
///
/// S3 credentials and endpoint come from the usual `AWS_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Directory on this host, served by the router.
    Local(PathBuf),
    /// Process memory. Reports are gone after a restart.
    Memory,
    /// S3 or S3-compatible bucket, with keys under `prefix`.
    S3 {
        bucket: String,
        prefix: String,
        region: Option<String>,
    },
}

impl StoreLocation {
    /// Parses a store URL such as `s3://bucket/prefix` or `file:///path`.
    pub fn parse(raw: &str) -> Result<Self, StoreConfigError> {
        let invalid = |reason: &str| StoreConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Self::Local)
                .map_err(|()| invalid("not an absolute path")),
            "memory" => Ok(Self::Memory),
            "s3" => {
                let bucket = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| invalid("missing bucket"))?
                    .to_string();
                let region = url
                    .query_pairs()
                    .find(|(key, _)| key == "region")
                    .map(|(_, value)| value.into_owned());

                Ok(Self::S3 {
                    bucket,
                    prefix: url.path().trim_matches('/').to_string(),
                    region,
                })
            }
            other => Err(StoreConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Directory the router publishes reports from, for local stores.
    pub fn served_dir(&self) -> Option<&Path> {
        match self {
            Self::Local(dir) => Some(dir),
            Self::Memory | Self::S3 { .. } => None,
        }
    }

    /// Whether reports in this store are published by an external service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::S3 { .. })
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(dir) => write!(f, "file://{}", dir.display()),
            Self::Memory => f.write_str("memory://"),
            Self::S3 { bucket, prefix, .. } => write!(f, "s3://{bucket}/{prefix}"),
        }
    }
}
