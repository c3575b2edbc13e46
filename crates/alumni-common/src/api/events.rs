use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldError, required_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date_time: DateTime<Utc>,
    pub location: Option<String>,
    pub institute_id: Option<i64>,
}

/// Event posted by an institute administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub institute_id: Option<i64>,
}

impl NewEvent {
    pub fn validated(self) -> Result<Self, FieldError> {
        Ok(Self {
            title: required_text("title", &self.title, 100)?,
            description: required_text("description", &self.description, usize::MAX)?,
            location: required_text("location", &self.location, 100)?,
            ..self
        })
    }
}
