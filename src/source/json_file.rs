use std::io::Write;
use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncReadExt;

use crate::flags::{FlagName, FlagOverrides};
use crate::source::FlagDataSource;

const XDG_PREFIX: &str = "flagsync";
const XDG_STORAGE_FILENAME: &str = "overrides.json";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No HOME is available")]
    NoHome,

    #[error("The storage location has no parent directory")]
    LocationHasNoParent,

    #[error("Serializing / deserializing failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Loading overrides failed when opening the file `{0}`: {1}")]
    Open(PathBuf, std::io::Error),

    #[error("Creating the overrides file `{0}` failed: {1}")]
    Create(PathBuf, std::io::Error),

    #[error("Reading overrides from `{0}` failed: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Writing overrides to `{0}` failed: {1}")]
    Write(PathBuf, std::io::Error),

    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

/// Override persistence backed by a JSON file, written atomically via a
/// temporary file in the same directory.
pub struct JsonFile {
    location: PathBuf,
    directory: PathBuf,
}

impl JsonFile {
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument)]
    pub fn new(location: PathBuf) -> Option<Self> {
        Some(Self {
            directory: location.parent()?.to_owned(),
            location,
        })
    }

    /// Place the overrides file in the XDG state directory.
    pub fn try_default() -> Result<Self, Error> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX);

        let file = xdg_dirs
            .place_state_file(XDG_STORAGE_FILENAME)
            .map_err(|e| {
                match xdg_dirs
                    .get_state_file(XDG_STORAGE_FILENAME)
                    .ok_or(Error::NoHome)
                {
                    Ok(loc) => Error::Create(loc, e),
                    Err(e) => e,
                }
            })?;

        Self::new(file).ok_or(Error::LocationHasNoParent)
    }

    async fn load(&self) -> Result<FlagOverrides, Error> {
        let mut file = match OpenOptions::new()
            .read(true)
            .write(false)
            .create(false)
            .truncate(false)
            .open(&self.location)
            .await
        {
            Ok(file) => file,
            // A missing file means no overrides have been persisted yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FlagOverrides::default());
            }
            Err(e) => return Err(Error::Open(self.location.clone(), e)),
        };

        let mut contents = vec![];
        file.read_to_end(&mut contents)
            .await
            .map_err(|e| Error::Read(self.location.clone(), e))?;

        Ok(serde_json::from_slice(&contents)?)
    }

    async fn store(&self, overrides: &FlagOverrides) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(overrides)?;

        let directory = self.directory.clone();
        let location = self.location.clone();

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let mut tempfile = tempfile::NamedTempFile::new_in(&directory)
                .map_err(|e| Error::Create(directory.clone(), e))?;

            tempfile
                .write_all(json.as_bytes())
                .map_err(|e| Error::Write(tempfile.path().into(), e))?;

            tempfile.persist(&location)?;

            Ok(())
        })
        .await??;

        tracing::trace!(location = ?self.location, "Overrides persisted");

        Ok(())
    }
}

impl FlagDataSource for JsonFile {
    type Error = Error;

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    async fn fetch_flags(&self) -> Result<FlagOverrides, Error> {
        self.load().await
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self, overrides)))]
    async fn persist_overrides(&mut self, overrides: FlagOverrides) -> Result<(), Error> {
        let mut current = self.load().await?;
        current.merge_from(&overrides);
        self.store(&current).await
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    async fn reset_override(&mut self, flag: FlagName) -> Result<(), Error> {
        let mut current = self.load().await?;
        current.clear(flag);
        self.store(&current).await
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    async fn reset_all_overrides(&mut self) -> Result<(), Error> {
        self.store(&FlagOverrides::default()).await
    }
}
