/*
 * Responsibility
 * - Request/response DTOs for /games
 * - validate() trims and checks fields, then hands the repo a GameFields
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::game_repo::{GameFields, GameRow};

const TEXT_MAX: usize = 200;
const NOTES_MAX: usize = 1000;
const RATING_MAX: f64 = 10.0;

/// Body of POST /games and PUT /games/{id}. PUT replaces every field.
#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub rating: Option<f64>,
    // "YYYY-MM-DD"
    pub release_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn required_text(
    value: &str,
    code: &'static str,
    field: &'static str,
) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > TEXT_MAX {
        return Err(AppError::bad_request(
            code,
            format!("{field} must be 1-{TEXT_MAX} characters"),
        ));
    }
    Ok(value.to_string())
}

impl GameRequest {
    pub fn validate(self) -> Result<GameFields, AppError> {
        let title = required_text(&self.title, "INVALID_TITLE", "title")?;
        let genre = required_text(&self.genre, "INVALID_GENRE", "genre")?;
        let platform = required_text(&self.platform, "INVALID_PLATFORM", "platform")?;

        if let Some(rating) = self.rating
            && !(rating.is_finite() && (0.0..=RATING_MAX).contains(&rating))
        {
            return Err(AppError::bad_request(
                "INVALID_RATING",
                "rating must be between 0 and 10",
            ));
        }

        if let Some(notes) = &self.notes
            && notes.chars().count() > NOTES_MAX
        {
            return Err(AppError::bad_request(
                "INVALID_NOTES",
                "notes must be <= 1000 characters",
            ));
        }

        Ok(GameFields {
            title,
            genre,
            platform,
            rating: self.rating,
            release_date: self.release_date,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl From<GameRow> for GameResponse {
    fn from(row: GameRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            genre: row.genre,
            platform: row.platform,
            rating: row.rating,
            release_date: row.release_date,
            notes: row.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GameRequest {
        GameRequest {
            title: "  Hades ".to_string(),
            genre: "Roguelike".to_string(),
            platform: "PC".to_string(),
            rating: Some(9.5),
            release_date: NaiveDate::from_ymd_opt(2020, 9, 17),
            notes: Some("   ".to_string()),
        }
    }

    fn code_of(req: GameRequest) -> &'static str {
        match req.validate() {
            Err(AppError::BadRequest { code, .. }) => code,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_trims_and_drops_blank_notes() {
        let fields = request().validate().unwrap();
        assert_eq!(fields.title, "Hades");
        assert_eq!(fields.notes, None);
        assert_eq!(fields.rating, Some(9.5));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut req = request();
        req.title = " ".to_string();
        assert_eq!(code_of(req), "INVALID_TITLE");

        let mut req = request();
        req.platform = "x".repeat(TEXT_MAX + 1);
        assert_eq!(code_of(req), "INVALID_PLATFORM");

        for rating in [-0.5, 10.5, f64::NAN, f64::INFINITY] {
            let mut req = request();
            req.rating = Some(rating);
            assert_eq!(code_of(req), "INVALID_RATING", "{rating}");
        }

        let mut req = request();
        req.notes = Some("n".repeat(NOTES_MAX + 1));
        assert_eq!(code_of(req), "INVALID_NOTES");
    }

    #[test]
    fn test_release_date_wire_format() {
        let req: GameRequest = serde_json::from_str(
            r#"{"title":"Hades","genre":"Roguelike","platform":"PC","release_date":"2020-09-17"}"#,
        )
        .unwrap();
        assert_eq!(req.release_date, NaiveDate::from_ymd_opt(2020, 9, 17));
        assert_eq!(req.rating, None);

        assert!(
            serde_json::from_str::<GameRequest>(
                r#"{"title":"Hades","genre":"R","platform":"PC","release_date":"17/09/2020"}"#,
            )
            .is_err()
        );
    }
}
