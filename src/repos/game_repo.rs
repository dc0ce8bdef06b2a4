/*
 * Responsibility
 * - In-process game collection, one shelf per user
 * - Every operation is scoped by owner: another user's game behaves as missing
 * - Titles are unique within a shelf (case-insensitive)
 */
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Writable fields of a game, already validated by the caller.
#[derive(Debug, Clone)]
pub struct GameFields {
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct GameRepo {
    games: RwLock<HashMap<Uuid, GameRow>>,
}

fn title_taken(
    games: &HashMap<Uuid, GameRow>,
    owner: Uuid,
    title: &str,
    except: Option<Uuid>,
) -> bool {
    games
        .values()
        .any(|g| g.owner == owner && Some(g.id) != except && g.title.eq_ignore_ascii_case(title))
}

impl GameRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, GameRow>>, RepoError> {
        self.games
            .read()
            .map_err(|_| RepoError::Unavailable("game store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, GameRow>>, RepoError> {
        self.games
            .write()
            .map_err(|_| RepoError::Unavailable("game store lock poisoned".to_string()))
    }

    /// The owner's shelf, ordered by title.
    pub fn list(&self, owner: Uuid) -> Result<Vec<GameRow>, RepoError> {
        let games = self.read()?;
        let mut rows: Vec<GameRow> = games
            .values()
            .filter(|g| g.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.title
                .to_ascii_lowercase()
                .cmp(&b.title.to_ascii_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    pub fn create(&self, owner: Uuid, fields: GameFields) -> Result<GameRow, RepoError> {
        let mut games = self.write()?;
        if title_taken(&games, owner, &fields.title, None) {
            return Err(RepoError::Conflict { field: "title" });
        }

        let row = GameRow {
            id: Uuid::new_v4(),
            owner,
            title: fields.title,
            genre: fields.genre,
            platform: fields.platform,
            rating: fields.rating,
            release_date: fields.release_date,
            notes: fields.notes,
        };
        games.insert(row.id, row.clone());
        Ok(row)
    }

    pub fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<GameRow>, RepoError> {
        let games = self.read()?;
        Ok(games.get(&id).filter(|g| g.owner == owner).cloned())
    }

    /// Replaces every writable field. `None` when the game is missing or not the owner's.
    pub fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: GameFields,
    ) -> Result<Option<GameRow>, RepoError> {
        let mut games = self.write()?;
        if !games.get(&id).is_some_and(|g| g.owner == owner) {
            return Ok(None);
        }
        if title_taken(&games, owner, &fields.title, Some(id)) {
            return Err(RepoError::Conflict { field: "title" });
        }

        let Some(row) = games.get_mut(&id) else {
            return Ok(None);
        };
        row.title = fields.title;
        row.genre = fields.genre;
        row.platform = fields.platform;
        row.rating = fields.rating;
        row.release_date = fields.release_date;
        row.notes = fields.notes;
        Ok(Some(row.clone()))
    }

    pub fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, RepoError> {
        let mut games = self.write()?;
        if games.get(&id).is_some_and(|g| g.owner == owner) {
            games.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
