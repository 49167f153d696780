//! Response body resolution
//!
//! The body source is classified once at startup. Per request, a literal is handed back as
//! shared bytes, a file is re-stat'ed and opened, and a directory maps the request path onto a
//! file below the root after cleaning out traversal segments.

use crate::config::BodySource;
use crate::utils::error::{ConfigError, RequestError};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Startup classification of the body source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    Literal(Bytes),
    File(PathBuf),
    /// Absolute directory root
    Directory(PathBuf),
}

/// Body for one request
#[derive(Debug)]
pub enum ResolvedBody {
    Empty,
    Literal(Bytes),
    File(ServedFile),
}

/// An opened file ready to stream
#[derive(Debug)]
pub struct ServedFile {
    /// Path that was opened
    pub path: PathBuf,
    /// Size at stat time
    pub len: u64,
    pub file: File,
    /// Whether the path came from directory mode
    pub from_directory: bool,
}

/// Resolves the configured body source for each request
#[derive(Debug, Clone)]
pub struct BodyResolver {
    kind: BodyKind,
}

impl BodyResolver {
    /// Classify `source` against the filesystem.
    ///
    /// A `Path` must exist and be a regular file or a directory; anything else fails startup.
    pub fn classify(source: &BodySource) -> Result<Self, ConfigError> {
        let kind = match source {
            BodySource::None => BodyKind::Empty,
            BodySource::Literal(text) => BodyKind::Literal(Bytes::from(text.clone())),
            BodySource::Path(path) => {
                let metadata = std::fs::metadata(path).map_err(|source| ConfigError::BodySource {
                    path: path.clone(),
                    source,
                })?;

                if metadata.is_file() {
                    BodyKind::File(path.clone())
                } else if metadata.is_dir() {
                    let root =
                        std::path::absolute(path).map_err(|source| ConfigError::BodySource {
                            path: path.clone(),
                            source,
                        })?;
                    BodyKind::Directory(root)
                } else {
                    return Err(ConfigError::UnsupportedBodySource { path: path.clone() });
                }
            }
        };

        debug!("body source classified as {:?}", kind);
        Ok(Self { kind })
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    /// Resolve the body for a request to `request_path` (only used in directory mode)
    pub async fn resolve(&self, request_path: &str) -> Result<ResolvedBody, RequestError> {
        match &self.kind {
            BodyKind::Empty => Ok(ResolvedBody::Empty),
            BodyKind::Literal(bytes) => Ok(ResolvedBody::Literal(bytes.clone())),
            BodyKind::File(path) => open_file(path, false).await.map(ResolvedBody::File),
            BodyKind::Directory(root) => {
                let path = contain(root, request_path)?;
                open_file(&path, true).await.map(ResolvedBody::File)
            }
        }
    }
}

/// Reduce a request path to a relative path with no `.`, `..` or empty segments.
///
/// `..` never climbs above the start, so the result always stays below whatever it is
/// joined onto.
pub fn clean_request_path(path: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.iter().collect()
}

/// Join a cleaned request path onto `root` and reject anything that ends up outside it
fn contain(root: &Path, request_path: &str) -> Result<PathBuf, RequestError> {
    let joined = root.join(clean_request_path(request_path));
    let resolved =
        std::path::absolute(&joined).map_err(|source| RequestError::io("resolve", &joined, source))?;

    let escapes = !resolved.starts_with(root)
        || resolved
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if escapes {
        warn!(
            "rejecting '{}': resolves to '{}' outside of '{}'",
            request_path,
            resolved.display(),
            root.display()
        );
        return Err(RequestError::PathTraversal {
            requested: request_path.to_string(),
            root: root.to_path_buf(),
        });
    }

    Ok(resolved)
}

async fn open_file(path: &Path, from_directory: bool) -> Result<ServedFile, RequestError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| RequestError::io("stat", path, source))?;
    if !metadata.is_file() {
        return Err(RequestError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)
        .await
        .map_err(|source| RequestError::io("open", path, source))?;

    Ok(ServedFile {
        path: path.to_path_buf(),
        len: metadata.len(),
        file,
        from_directory,
    })
}

/// Stream a file in fixed-size chunks
pub fn file_stream(mut file: File) -> impl Stream<Item = Result<Bytes, io::Error>> + 'static {
    async_stream::try_stream! {
        loop {
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            let read = file.read_buf(&mut buf).await?;
            if read == 0 {
                break;
            }
            yield buf.freeze();
        }
    }
}
