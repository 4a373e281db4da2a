//! Status icon loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use mirror_ipc::Icon;

use crate::error::IconError;
use crate::IconResult;

/// Icon shown once the device is disconnected.
pub const ICON_FILENAME_DISCONNECTED: &str = "disconnected.png";

/// Environment variable overriding the icon directory.
pub const ICON_DIR_ENV: &str = "MIRROR_ICON_DIR";

/// Source of decoded icons.
pub trait IconLoader: Send + Sync + 'static {
    /// Load the icon with the given file name.
    fn load(&self, name: &str) -> IconResult<Icon>;
}

impl<T: IconLoader + ?Sized> IconLoader for Arc<T> {
    fn load(&self, name: &str) -> IconResult<Icon> {
        (**self).load(name)
    }
}

/// Loads icons from image files on disk.
///
/// The directory is, in order: the one given to [`FileIconLoader::with_dir`],
/// the `MIRROR_ICON_DIR` environment variable, the directory containing
/// the running executable.
#[derive(Debug, Clone, Default)]
pub struct FileIconLoader {
    dir: Option<PathBuf>,
}

impl FileIconLoader {
    /// Create a loader using the environment or executable directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader reading from a fixed directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Create a loader from an optional configured directory.
    pub fn from_config(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
        }
    }

    /// Full path of the icon file `name`.
    pub fn resolve(&self, name: &str) -> IconResult<PathBuf> {
        if let Some(ref dir) = self.dir {
            return Ok(dir.join(name));
        }

        if let Some(dir) = env::var_os(ICON_DIR_ENV) {
            return Ok(PathBuf::from(dir).join(name));
        }

        let executable =
            env::current_exe().map_err(|e| IconError::NoExecutableDir(e.to_string()))?;
        let dir = executable.parent().ok_or_else(|| {
            IconError::NoExecutableDir(format!(
                "unexpected executable path: {}",
                executable.display()
            ))
        })?;

        Ok(dir.join(name))
    }
}

impl IconLoader for FileIconLoader {
    fn load(&self, name: &str) -> IconResult<Icon> {
        let path = self.resolve(name)?;

        let data = fs::read(&path).map_err(|source| IconError::Io {
            path: path.clone(),
            source,
        })?;

        let image = image::load_from_memory(&data).map_err(|source| IconError::Decode {
            path: path.clone(),
            source,
        })?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        debug!(path = %path.display(), width, height, "Loaded icon");
        Ok(Icon::new(Bytes::from(rgba.into_raw()), width, height))
    }
}
