use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scan::ProtonRecord;

/// One game in the catalog.
///
/// JSON keys match the catalog file written by earlier launcher versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub name: String,
    #[serde(rename = "executable")]
    pub executable_path: PathBuf,
    #[serde(rename = "prefix")]
    pub prefix_path: PathBuf,
    #[serde(rename = "proton_version", default, skip_serializing_if = "Option::is_none")]
    pub proton_name: Option<String>,
    #[serde(rename = "proton_path", default, skip_serializing_if = "Option::is_none")]
    pub proton_install_dir: Option<PathBuf>,
    #[serde(rename = "proton_bin", default, skip_serializing_if = "Option::is_none")]
    pub proton_runner_binary: Option<PathBuf>,
    /// Extra environment variables for this game only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub launch_options: BTreeMap<String, String>,
    /// Launch with full Wine debug output by default.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub verbose_logging: bool,
    /// `WINEDEBUG` for non-verbose launches; the quiet default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_log_level: Option<String>,
    /// Minutes played across all sessions.
    #[serde(default)]
    pub time_played: u64,
    #[serde(default)]
    pub times_opened: u32,
    #[serde(default)]
    pub times_crashed: u32,
}

/// The compatibility layer a game runs through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatLayer {
    Wine,
    Proton {
        name: Option<String>,
        install_dir: PathBuf,
        runner: PathBuf,
    },
}

impl CompatLayer {
    pub fn is_proton(&self) -> bool {
        matches!(self, CompatLayer::Proton { .. })
    }

    pub fn label(&self) -> String {
        match self {
            CompatLayer::Wine => "Wine (default)".to_string(),
            CompatLayer::Proton { name, .. } => match name {
                Some(name) => name.clone(),
                None => "Proton".to_string(),
            },
        }
    }
}

impl GameRecord {
    pub fn new(
        name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
        prefix_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            executable_path: executable_path.into(),
            prefix_path: prefix_path.into(),
            proton_name: None,
            proton_install_dir: None,
            proton_runner_binary: None,
            launch_options: BTreeMap::new(),
            verbose_logging: false,
            wine_log_level: None,
            time_played: 0,
            times_opened: 0,
            times_crashed: 0,
        }
    }

    pub fn with_proton(mut self, proton: &ProtonRecord) -> Self {
        self.proton_name = Some(proton.name.clone());
        self.proton_install_dir = Some(proton.install_dir.clone());
        self.proton_runner_binary = Some(proton.runner_binary.clone());
        self
    }

    /// Proton iff a runner binary is recorded, Wine otherwise.
    pub fn compat_layer(&self) -> CompatLayer {
        match &self.proton_runner_binary {
            Some(runner) => {
                let install_dir = self
                    .proton_install_dir
                    .clone()
                    .or_else(|| runner.parent().map(|p| p.to_path_buf()))
                    .unwrap_or_default();
                CompatLayer::Proton {
                    name: self.proton_name.clone(),
                    install_dir,
                    runner: runner.clone(),
                }
            }
            None => CompatLayer::Wine,
        }
    }
}

/// The persisted game list plus the file it lives in.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(super) path: PathBuf,
    pub(super) games: Vec<GameRecord>,
}

/// Request from the add-game dialog.
#[derive(Debug, Clone)]
pub struct AddGameRequest {
    pub name: String,
    pub executable_path: PathBuf,
    pub prefix_path: PathBuf,
    pub proton: Option<ProtonRecord>,
}

/// Request from the rename dialog.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub old_name: String,
    pub new_name: String,
}

impl From<AddGameRequest> for GameRecord {
    fn from(req: AddGameRequest) -> Self {
        let record = GameRecord::new(req.name.trim(), req.executable_path, req.prefix_path);
        match &req.proton {
            Some(proton) => record.with_proton(proton),
            None => record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_runner_uses_wine() {
        let game = GameRecord::new("Foo", "/games/foo/foo.exe", "/prefixes/p1");
        assert_eq!(game.compat_layer(), CompatLayer::Wine);
    }

    #[test]
    fn install_dir_defaults_to_runner_parent() {
        let mut game = GameRecord::new("Foo", "/games/foo/foo.exe", "/prefixes/p1");
        game.proton_runner_binary = Some("/steam/common/Proton 9.0/proton".into());

        match game.compat_layer() {
            CompatLayer::Proton { install_dir, .. } => {
                assert_eq!(install_dir, PathBuf::from("/steam/common/Proton 9.0"))
            }
            CompatLayer::Wine => panic!("expected proton"),
        }
    }

    #[test]
    fn json_keys_match_catalog_file() {
        let json = r#"{
            "name": "Foo",
            "executable": "/games/foo/foo.exe",
            "prefix": "/prefixes/p1",
            "proton_version": "GE-Proton9-20",
            "proton_path": "/compat/GE-Proton9-20",
            "proton_bin": "/compat/GE-Proton9-20/proton"
        }"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.executable_path, PathBuf::from("/games/foo/foo.exe"));
        assert_eq!(game.proton_name.as_deref(), Some("GE-Proton9-20"));
        assert!(game.compat_layer().is_proton());
        assert!(game.launch_options.is_empty());

        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["prefix"], "/prefixes/p1");
        assert!(value.get("launch_options").is_none());
        assert_eq!(value["times_opened"], 0);
    }

    #[test]
    fn statistics_and_log_level_default_when_absent() {
        let json = r#"{"name": "Foo", "executable": "/a.exe", "prefix": "/p1"}"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!((game.time_played, game.times_opened, game.times_crashed), (0, 0, 0));
        assert!(game.wine_log_level.is_none());

        let json = r#"{"name": "Foo", "executable": "/a.exe", "prefix": "/p1",
            "wine_log_level": "err+all", "time_played": 42, "times_opened": 3, "times_crashed": 1}"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.wine_log_level.as_deref(), Some("err+all"));
        assert_eq!(game.time_played, 42);
        assert_eq!(game.times_crashed, 1);
    }
}
