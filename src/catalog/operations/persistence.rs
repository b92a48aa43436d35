// Catalog persistence - load and atomic save

use crate::catalog::pure::{unique_name, validate_name};
use crate::catalog::types::{Catalog, GameRecord};
use crate::error::CatalogError;
use crate::paths::PATH_CATALOG;

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

impl Catalog {
    /// Load the catalog from the default per-user location.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::load(&PATH_CATALOG)
    }

    /// Load the catalog at `path`. A missing file is an empty catalog.
    ///
    /// Names are made unique on load: files written before uniqueness was
    /// enforced may repeat a name, and later records are renamed to
    /// `"<name> (n)"` so every game stays reachable by name.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let loaded = match File::open(path) {
            Ok(file) => serde_json::from_reader::<_, Vec<GameRecord>>(BufReader::new(file))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut games: Vec<GameRecord> = Vec::with_capacity(loaded.len());
        for mut game in loaded {
            if let Err(e) = validate_name(&games, &game.name, None) {
                let renamed = unique_name(&games, &game.name);
                tracing::warn!(
                    "catalog: {} in {}, keeping the record as '{}'",
                    e,
                    path.display(),
                    renamed
                );
                game.name = renamed;
            }
            games.push(game);
        }
        tracing::debug!("catalog: loaded {} game(s) from {}", games.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            games,
        })
    }

    /// An empty catalog that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            games: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the catalog as pretty JSON.
    ///
    /// The data goes to a sibling temp file which is then renamed over the
    /// target, so a crash never leaves a truncated catalog behind.
    pub fn save(&self) -> Result<(), CatalogError> {
        self.write(&self.games)
    }

    /// Persist `games` and adopt them only once they are on disk, so a
    /// failed write leaves both the file and the in-memory catalog as they
    /// were.
    pub(super) fn commit(&mut self, games: Vec<GameRecord>) -> Result<(), CatalogError> {
        self.write(&games)?;
        self.games = games;
        Ok(())
    }

    fn write(&self, games: &[GameRecord]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        {
            let mut file = File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, games)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("catalog: saved {} game(s) to {}", games.len(), self.path.display());
        Ok(())
    }
}
