use serde::Deserialize;

use super::repo::{ActivityType, Difficulty, ExperienceChanges, NewExperience};
use crate::{error::ApiError, wire::clean_optional};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateExperienceRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub activity_type: ActivityType,
    pub difficulty_level: Difficulty,
    pub price_per_person: f64,
    pub duration_hours: f64,
    #[serde(default = "default_min_guests")]
    pub min_guests: i32,
    pub max_guests: i32,
}

fn default_min_guests() -> i32 {
    1
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateExperienceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub activity_type: Option<ActivityType>,
    pub difficulty_level: Option<Difficulty>,
    pub price_per_person: Option<f64>,
    pub duration_hours: Option<f64>,
    pub min_guests: Option<i32>,
    pub max_guests: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListExperiencesQuery {
    pub activity_type: Option<ActivityType>,
    pub location: Option<String>,
    pub max_price: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl ListExperiencesQuery {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_LIMIT), self.offset.max(0))
    }
}

fn clean_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request("title must be 1-200 characters"));
    }
    Ok(title.to_string())
}

fn clean_location(location: &str) -> Result<String, ApiError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(ApiError::bad_request("location is required"));
    }
    Ok(location.to_string())
}

fn check_numbers(price: f64, duration: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("price_per_person must be >= 0"));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ApiError::bad_request("duration_hours must be > 0"));
    }
    Ok(())
}

fn check_guests(min: i32, max: i32) -> Result<(), ApiError> {
    if min < 1 || max < min {
        return Err(ApiError::bad_request(
            "guest bounds must satisfy 1 <= min_guests <= max_guests",
        ));
    }
    Ok(())
}

impl CreateExperienceRequest {
    pub fn into_new(self, host_id: Uuid) -> Result<NewExperience, ApiError> {
        check_numbers(self.price_per_person, self.duration_hours)?;
        check_guests(self.min_guests, self.max_guests)?;
        Ok(NewExperience {
            host_id,
            title: clean_title(&self.title)?,
            description: clean_optional(self.description),
            location: clean_location(&self.location)?,
            activity_type: self.activity_type,
            difficulty_level: self.difficulty_level,
            price_per_person: self.price_per_person,
            duration_hours: self.duration_hours,
            min_guests: self.min_guests,
            max_guests: self.max_guests,
        })
    }
}

impl UpdateExperienceRequest {
    /// Validates the patch against the values it would produce on `current`.
    pub fn into_changes(
        self,
        current: &super::repo::Experience,
    ) -> Result<ExperienceChanges, ApiError> {
        check_numbers(
            self.price_per_person.unwrap_or(current.price_per_person),
            self.duration_hours.unwrap_or(current.duration_hours),
        )?;
        check_guests(
            self.min_guests.unwrap_or(current.min_guests),
            self.max_guests.unwrap_or(current.max_guests),
        )?;
        Ok(ExperienceChanges {
            title: self.title.as_deref().map(clean_title).transpose()?,
            description: clean_optional(self.description),
            location: self.location.as_deref().map(clean_location).transpose()?,
            activity_type: self.activity_type,
            difficulty_level: self.difficulty_level,
            price_per_person: self.price_per_person,
            duration_hours: self.duration_hours,
            min_guests: self.min_guests,
            max_guests: self.max_guests,
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateExperienceRequest {
        CreateExperienceRequest {
            title: "  Reef snorkel ".into(),
            description: Some("   ".into()),
            location: "North Reef".into(),
            activity_type: ActivityType::Snorkeling,
            difficulty_level: Difficulty::Beginner,
            price_per_person: 55.0,
            duration_hours: 1.5,
            min_guests: 1,
            max_guests: 8,
        }
    }

    #[test]
    fn create_request_is_sanitized() {
        let new = request().into_new(Uuid::nil()).unwrap();
        assert_eq!(new.title, "Reef snorkel");
        assert_eq!(new.description, None);
    }

    #[test]
    fn create_request_rejects_bad_bounds() {
        let mut r = request();
        r.max_guests = 0;
        assert!(r.into_new(Uuid::nil()).is_err());

        let mut r = request();
        r.price_per_person = -1.0;
        assert!(r.into_new(Uuid::nil()).is_err());

        let mut r = request();
        r.title = "   ".into();
        assert!(r.into_new(Uuid::nil()).is_err());
    }

    #[test]
    fn query_limits_are_clamped() {
        let q: ListExperiencesQuery =
            serde_json::from_value(serde_json::json!({"limit": 5000, "offset": -3})).unwrap();
        assert_eq!(q.clamped(), (100, 0));
        let q: ListExperiencesQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(q.clamped(), (20, 0));
    }
}
