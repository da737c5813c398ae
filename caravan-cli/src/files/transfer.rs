//! File transfer into managed storage (local copy/move and remote download)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use super::storage::SchemeRegistry;

/// How a destination collision is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite the existing file silently
    Replace,
    /// Append a numeric suffix until the name is unique
    Rename,
    /// Fail when the destination already exists
    ErrorOnExisting,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictPolicy::Replace => write!(f, "replace"),
            ConflictPolicy::Rename => write!(f, "rename"),
            ConflictPolicy::ErrorOnExisting => write!(f, "error-on-existing"),
        }
    }
}

/// Whether a local transfer copies or moves the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "copy"),
            TransferMode::Move => write!(f, "move"),
        }
    }
}

/// Error from a transfer attempt
#[derive(Debug)]
pub enum TransferError {
    /// Destination exists and the policy forbids touching it
    DestinationExists { destination: String },
    /// Destination URI does not map to local storage
    UnresolvableDestination { destination: String },
    /// The source could not be read (missing file, failed request)
    SourceUnavailable { source: String, reason: String },
    /// Writing to local storage failed
    Io { path: String, reason: String },
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::DestinationExists { destination } => {
                write!(f, "destination {} already exists", destination)
            }
            TransferError::UnresolvableDestination { destination } => {
                write!(f, "destination {} does not resolve to local storage", destination)
            }
            TransferError::SourceUnavailable { source, reason } => {
                write!(f, "source {} unavailable: {}", source, reason)
            }
            TransferError::Io { path, reason } => {
                write!(f, "write failed at {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for TransferError {}

/// Moves file bytes into managed storage.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Transfer `source` to `destination`, returning the URI actually used.
    ///
    /// The returned URI differs from the requested one only when the policy
    /// is [`ConflictPolicy::Rename`] and the requested name was taken.
    async fn transfer(
        &self,
        source: &str,
        destination: &str,
        mode: TransferMode,
        policy: ConflictPolicy,
    ) -> Result<String, TransferError>;
}

/// Transfer implementation over the local filesystem and HTTP.
pub struct LocalFileTransfer {
    schemes: Arc<SchemeRegistry>,
    http: reqwest::Client,
}

impl LocalFileTransfer {
    pub fn new(schemes: Arc<SchemeRegistry>) -> Self {
        Self {
            schemes,
            http: reqwest::Client::new(),
        }
    }

    /// Share an existing HTTP client instead of building a fresh one.
    pub fn with_client(schemes: Arc<SchemeRegistry>, http: reqwest::Client) -> Self {
        Self { schemes, http }
    }

    /// Apply the conflict policy, returning the URI and path to write to.
    async fn settle_destination(
        &self,
        destination: &str,
        path: PathBuf,
        policy: ConflictPolicy,
    ) -> Result<(String, PathBuf), TransferError> {
        let occupied = path_exists(&path).await;

        match policy {
            ConflictPolicy::Replace => Ok((destination.to_string(), path)),
            ConflictPolicy::ErrorOnExisting => {
                if occupied {
                    Err(TransferError::DestinationExists {
                        destination: destination.to_string(),
                    })
                } else {
                    Ok((destination.to_string(), path))
                }
            }
            ConflictPolicy::Rename => {
                if !occupied {
                    return Ok((destination.to_string(), path));
                }
                let mut counter = 0u32;
                loop {
                    let candidate = numbered_uri(destination, counter);
                    let candidate_path = self.schemes.resolve(&candidate).ok_or_else(|| {
                        TransferError::UnresolvableDestination {
                            destination: candidate.clone(),
                        }
                    })?;
                    if !path_exists(&candidate_path).await {
                        return Ok((candidate, candidate_path));
                    }
                    counter += 1;
                }
            }
        }
    }

    /// Stream a remote source into the destination file.
    async fn download(&self, source: &str, path: &Path) -> Result<(), TransferError> {
        let unavailable = |reason: String| TransferError::SourceUnavailable {
            source: source.to_string(),
            reason,
        };

        let response = self
            .http
            .get(source)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| io_error(path, &e))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| unavailable(e.to_string()))?;
            file.write_all(&chunk).await.map_err(|e| io_error(path, &e))?;
        }
        file.flush().await.map_err(|e| io_error(path, &e))?;

        Ok(())
    }
}

#[async_trait]
impl FileTransfer for LocalFileTransfer {
    async fn transfer(
        &self,
        source: &str,
        destination: &str,
        mode: TransferMode,
        policy: ConflictPolicy,
    ) -> Result<String, TransferError> {
        let requested = self.schemes.resolve(destination).ok_or_else(|| {
            TransferError::UnresolvableDestination {
                destination: destination.to_string(),
            }
        })?;

        let (final_uri, final_path) = self.settle_destination(destination, requested, policy).await?;

        if let Some(parent) = final_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        if self.schemes.is_local(source) {
            let source_path =
                self.schemes
                    .resolve(source)
                    .ok_or_else(|| TransferError::SourceUnavailable {
                        source: source.to_string(),
                        reason: "uri does not resolve to a local path".to_string(),
                    })?;

            match mode {
                TransferMode::Copy => copy_file(source, &source_path, &final_path).await?,
                TransferMode::Move => move_file(source, &source_path, &final_path).await?,
            }
        } else {
            self.download(source, &final_path).await?;
        }

        log::debug!("Transferred {} -> {} ({}, {})", source, final_uri, mode, policy);
        Ok(final_uri)
    }
}

/// Transfer that moves nothing and answers with the requested URI.
///
/// Backs dry runs: path and policy decisions still happen upstream, the
/// bytes stay where they are.
pub struct DryRunTransfer;

#[async_trait]
impl FileTransfer for DryRunTransfer {
    async fn transfer(
        &self,
        source: &str,
        destination: &str,
        mode: TransferMode,
        policy: ConflictPolicy,
    ) -> Result<String, TransferError> {
        log::info!("Dry run: would transfer {} -> {} ({}, {})", source, destination, mode, policy);
        Ok(destination.to_string())
    }
}

async fn copy_file(source: &str, from: &Path, to: &Path) -> Result<(), TransferError> {
    tokio::fs::copy(from, to).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TransferError::SourceUnavailable {
                source: source.to_string(),
                reason: "file not found".to_string(),
            }
        } else {
            io_error(to, &e)
        }
    })?;
    Ok(())
}

/// Rename, falling back to copy + remove when the rename crosses filesystems.
async fn move_file(source: &str, from: &Path, to: &Path) -> Result<(), TransferError> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    copy_file(source, from, to).await?;
    if let Err(e) = tokio::fs::remove_file(from).await {
        // Bytes are already in place; losing the source copy is not fatal
        log::warn!("Moved {} but could not remove the original: {}", source, e);
    }
    Ok(())
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn io_error(path: &Path, e: &std::io::Error) -> TransferError {
    TransferError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Insert `_{n}` before the last extension of the URI's final segment.
fn numbered_uri(uri: &str, n: u32) -> String {
    match uri.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}", dir, numbered_segment(name, n)),
        None => numbered_segment(uri, n),
    }
}

fn numbered_segment(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", name, n),
    }
}
