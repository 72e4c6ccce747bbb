//! Key-value blob stores.
//!
//! A blob store holds opaque string values under string keys. The medication
//! store keeps its whole list in a single slot and rewrites it on every
//! change, so stores only need whole-value reads and writes.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// A persistent slot-per-key string store.
pub trait BlobStore {
    /// Read the value stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// A blob store backed by a directory, one `<key>.json` file per key.
///
/// Keys must be plain file name stems: non-empty, without path separators
/// and without `..`. Other keys are rejected with
/// [`io::ErrorKind::InvalidInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Opens a store rooted at the given directory.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory blobs are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a key is stored in.
    ///
    /// # Errors
    ///
    /// Returns an [`io::ErrorKind::InvalidInput`] error if the key could
    /// name a file outside the root directory.
    pub fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn check_key(key: &str) -> io::Result<()> {
    if key.is_empty() || key.contains(['/', '\\', '\0']) || key.contains("..") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid storage key '{key}'"),
        ));
    }
    Ok(())
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        // the blob is replaced atomically by rename
        let staging = self.root.join(format!(".{key}.json.tmp"));
        if let Err(e) = fs::write(&staging, value).and_then(|()| fs::rename(&staging, &path)) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                tracing::debug!("No staging file to clean up at {}: {cleanup}", staging.display());
            }
            return Err(e);
        }

        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// An in-memory blob store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBlobStore {
    values: HashMap<String, String>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<B: BlobStore + ?Sized> BlobStore for &mut B {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        (**self).write(key, value)
    }
}
