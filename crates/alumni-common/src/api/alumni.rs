use serde::{Deserialize, Serialize};

use super::validation::{FieldError, optional_text, required_text};

pub const DEFAULT_PHOTO_FILE: &str = "default_user.png";

/// Directory card for one alumnus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlumnusSummary {
    pub id: i64,
    pub name: String,
    pub major: Option<String>,
    pub city: Option<String>,
    pub graduation_year: i32,
    pub photo_file: String,
}

/// Full profile page for one alumnus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlumnusDetail {
    pub id: i64,
    pub name: String,
    pub major: Option<String>,
    pub city: Option<String>,
    pub graduation_year: i32,
    pub phone_number: Option<String>,
    pub linkedin_id: Option<String>,
    pub photo_file: String,
    pub profile_complete: bool,
    pub institute_id: Option<i64>,
    /// Contact address shown on the profile page.
    pub email: String,
}

/// Placeholder contact address for alumni without a linked account email.
pub fn placeholder_email(linkedin_id: Option<&str>) -> String {
    let local = linkedin_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or("alumnus");
    format!("{local}@example.com")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub alumni: Vec<AlumnusSummary>,
    /// Distinct graduation years, newest first, for the year filter.
    pub years: Vec<i32>,
    pub selected_year: Option<i32>,
}

/// Fields an alumnus supplies to finish their profile. Every field is
/// required; values are trimmed before they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompletion {
    pub major: String,
    pub city: String,
    pub phone_number: String,
    pub linkedin_id: String,
    #[serde(default)]
    pub photo_file: Option<String>,
}

impl ProfileCompletion {
    pub fn validated(self) -> Result<Self, FieldError> {
        Ok(Self {
            major: required_text("major", &self.major, 100)?,
            city: required_text("city", &self.city, 100)?,
            phone_number: required_text("phone_number", &self.phone_number, 20)?,
            linkedin_id: required_text("linkedin_id", &self.linkedin_id, 100)?,
            photo_file: optional_text("photo_file", self.photo_file.as_deref(), 100)?,
        })
    }
}

/// Accepts a year filter only when it is made of ASCII digits.
pub fn parse_year_filter(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_email_prefers_linkedin_id() {
        assert_eq!(placeholder_email(Some("jdoe")), "jdoe@example.com");
        assert_eq!(placeholder_email(Some("  ")), "alumnus@example.com");
        assert_eq!(placeholder_email(None), "alumnus@example.com");
    }

    #[test]
    fn year_filter_requires_digits() {
        assert_eq!(parse_year_filter(Some("2020")), Some(2020));
        assert_eq!(parse_year_filter(Some(" 1999 ")), Some(1999));
        assert_eq!(parse_year_filter(Some("20x0")), None);
        assert_eq!(parse_year_filter(Some("-2020")), None);
        assert_eq!(parse_year_filter(Some("")), None);
        assert_eq!(parse_year_filter(None), None);
    }

    #[test]
    fn completion_trims_and_requires_every_contact_field() {
        let completion = ProfileCompletion {
            major: " CS ".into(),
            city: "Pune".into(),
            phone_number: " +91 555 0100 ".into(),
            linkedin_id: "jdoe".into(),
            photo_file: Some("  ".into()),
        };

        let valid = completion.clone().validated().unwrap();
        assert_eq!(valid.major, "CS");
        assert_eq!(valid.phone_number, "+91 555 0100");
        assert_eq!(valid.photo_file, None);

        let blank_city = ProfileCompletion {
            city: "".into(),
            ..completion.clone()
        };
        assert_eq!(
            blank_city.validated(),
            Err(FieldError::Missing { field: "city" })
        );

        let long_phone = ProfileCompletion {
            phone_number: "1".repeat(21),
            ..completion
        };
        assert_eq!(
            long_phone.validated(),
            Err(FieldError::TooLong { field: "phone_number", max: 20 })
        );
    }
}
