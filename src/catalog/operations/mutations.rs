// Catalog mutations - every change is persisted immediately

use std::time::Duration;

use crate::catalog::pure::{record_play, validate_name};
use crate::catalog::types::{AddGameRequest, Catalog, GameRecord, RenameRequest};
use crate::error::CatalogError;

impl Catalog {
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.name == name)
    }

    /// Add a game. Names are unique: they key both the catalog and the
    /// active-launch registry.
    pub fn add(&mut self, mut game: GameRecord) -> Result<(), CatalogError> {
        validate_name(&self.games, &game.name, None)?;
        game.name = game.name.trim().to_string();
        let name = game.name.clone();

        let mut games = self.games.clone();
        games.push(game);
        self.commit(games)?;
        tracing::info!("catalog: added {}", name);
        Ok(())
    }

    pub fn add_request(&mut self, request: AddGameRequest) -> Result<(), CatalogError> {
        self.add(GameRecord::from(request))
    }

    pub fn rename(&mut self, request: &RenameRequest) -> Result<(), CatalogError> {
        let idx = self.index_of(&request.old_name)?;
        validate_name(&self.games, &request.new_name, Some(&request.old_name))?;
        let new_name = request.new_name.trim().to_string();

        let mut games = self.games.clone();
        games[idx].name = new_name.clone();
        self.commit(games)?;
        tracing::info!("catalog: renamed {} to {}", request.old_name, new_name);
        Ok(())
    }

    /// Replace the stored record with the same name (prefix or Proton change).
    pub fn update(&mut self, game: GameRecord) -> Result<(), CatalogError> {
        let idx = self.index_of(&game.name)?;
        let mut games = self.games.clone();
        games[idx] = game;
        self.commit(games)
    }

    pub fn remove(&mut self, name: &str) -> Result<GameRecord, CatalogError> {
        let idx = self.index_of(name)?;
        let mut games = self.games.clone();
        let game = games.remove(idx);
        self.commit(games)?;
        tracing::info!("catalog: removed {}", game.name);
        Ok(game)
    }

    /// Count a successful launch of `name`.
    pub fn record_launch(&mut self, name: &str) -> Result<(), CatalogError> {
        let idx = self.index_of(name)?;
        let mut games = self.games.clone();
        games[idx].times_opened = games[idx].times_opened.saturating_add(1);
        self.commit(games)
    }

    /// Add a finished session's play time, counting it as a crash if
    /// `crashed` is set.
    pub fn record_session(
        &mut self,
        name: &str,
        played: Duration,
        crashed: bool,
    ) -> Result<(), CatalogError> {
        let idx = self.index_of(name)?;
        let mut games = self.games.clone();
        record_play(&mut games[idx], played, crashed);
        self.commit(games)?;
        tracing::debug!(
            "catalog: {} played {} min this session (crashed: {})",
            name,
            played.as_secs() / 60,
            crashed
        );
        Ok(())
    }

    fn index_of(&self, name: &str) -> Result<usize, CatalogError> {
        self.games
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| CatalogError::UnknownGame(name.to_string()))
    }
}
