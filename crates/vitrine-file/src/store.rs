//! Filesystem storage for the file-backed object store.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use vitrine_core::error::{Error, InvalidInputError, ProtocolError};
use vitrine_core::{ObjectEntry, ObjectStore, PutOptions, Result, StoreUrl};

fn map_io(err: io::Error) -> Error {
    Error::Transport(err.into())
}

/// Filesystem-backed object store.
///
/// The object URL handed out by [`list`](ObjectStore::list) and
/// [`head`](ObjectStore::head) is the `file://` URL of the object's file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref()).map_err(map_io)?;
        Ok(Self { root })
    }

    /// Create a store from a `file://` store URL.
    pub fn from_url(url: &StoreUrl) -> Result<Self> {
        let path = url.to_file_path().ok_or_else(|| InvalidInputError::StoreUrl {
            value: url.to_string(),
            reason: "not a local file URL".to_string(),
        })?;
        Self::new(path)
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path under the root, refusing anything that could
    /// escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let reject = |reason: &str| {
            Error::InvalidInput(InvalidInputError::Key {
                value: key.to_string(),
                reason: reason.to_string(),
            })
        };

        if key.is_empty() {
            return Err(reject("empty key"));
        }
        if key.contains('\\') || key.chars().any(char::is_control) {
            return Err(reject("forbidden character"));
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            match segment {
                "" => return Err(reject("empty path segment")),
                "." | ".." => return Err(reject("traversal segment")),
                s => path.push(s),
            }
        }
        Ok(path)
    }

    fn entry_for(&self, key: &str, path: &Path) -> Result<ObjectEntry> {
        let url = Url::from_file_path(path).map_err(|_| InvalidInputError::Other {
            message: format!("cannot express {} as a file URL", path.display()),
        })?;
        Ok(ObjectEntry {
            key: key.to_string(),
            url: url.to_string(),
        })
    }

    /// Key of a file below the root, or `None` for files outside it or with
    /// non-UTF-8 names.
    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(s) => parts.push(s.to_str()?),
                _ => return None,
            }
        }
        Some(parts.join("/"))
    }

    /// Every regular file under `dir`, excluding in-flight temp files.
    async fn walk(&self, dir: PathBuf) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(map_io(e)),
            };

            while let Some(entry) = entries.next_entry().await.map_err(map_io)? {
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                let file_type = entry.file_type().await.map_err(map_io)?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl ObjectStore for FileStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        // Only the directory part of the prefix narrows the walk; the rest
        // is matched against each key.
        let dir = match prefix.rfind('/') {
            Some(i) => self.object_path(&prefix[..i])?,
            None => self.root.clone(),
        };

        let mut keyed: Vec<(String, PathBuf)> = self
            .walk(dir)
            .await?
            .into_iter()
            .filter_map(|path| self.key_for(&path).map(|key| (key, path)))
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();

        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.truncate(limit);

        let objects = keyed
            .iter()
            .map(|(key, path)| self.entry_for(key, path))
            .collect::<Result<Vec<_>>>()?;

        debug!(count = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>> {
        let path = self.object_path(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => self.entry_for(key, &path).map(Some),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e)),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| InvalidInputError::Other {
            message: format!("invalid object URL '{}': {}", url, e),
        })?;
        let path = parsed
            .to_file_path()
            .ok()
            .filter(|p| p.starts_with(&self.root))
            .ok_or_else(|| InvalidInputError::Other {
                message: format!("object URL '{}' is outside the store", url),
            })?;

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound {
                key: self.key_for(&path).unwrap_or_else(|| url.to_string()),
            }),
            Err(e) => Err(map_io(e)),
        }
    }

    #[instrument(skip(self, body), fields(root = %self.root.display()))]
    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry> {
        let path = self.object_path(key)?;

        if !options.allow_overwrite && tokio::fs::try_exists(&path).await.map_err(map_io)? {
            return Err(Error::Protocol(ProtocolError::new(
                409,
                Some("Conflict".to_string()),
                Some(format!("object {} already exists", key)),
            )));
        }

        let parent = path.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(parent).await.map_err(map_io)?;

        let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, body).await.map_err(map_io)?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(map_io(e));
        }

        debug!(key, bytes = body.len(), "stored object");
        self.entry_for(key, &path)
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_rejects_traversal() {
        let store = FileStore::new("/srv/objects").unwrap();
        assert!(store.object_path("notices/../../etc/passwd").is_err());
        assert!(store.object_path("notices//a.json").is_err());
        assert!(store.object_path("./a.json").is_err());
        assert!(store.object_path("a\\b.json").is_err());
        assert!(store.object_path("").is_err());
        assert_eq!(
            store.object_path("notices/a.json").unwrap(),
            Path::new("/srv/objects/notices/a.json")
        );
    }

    #[test]
    fn key_for_round_trips_object_path() {
        let store = FileStore::new("/srv/objects").unwrap();
        let path = store.object_path("gallery-views/x.json").unwrap();
        assert_eq!(store.key_for(&path).as_deref(), Some("gallery-views/x.json"));
        assert_eq!(store.key_for(Path::new("/elsewhere/x.json")), None);
    }
}
