pub mod api;
pub mod db;
pub mod logging;
pub mod recommend;

use serde::{Deserialize, Serialize};

pub use recommend::{RecommendError, ScoredProfile, rank, recommend};

/// The slice of an alumni record the recommender looks at.
///
/// `major` and `city` are free text and may be absent; absence is treated
/// as an empty string when the feature document is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub graduation_year: i32,
}

impl Profile {
    pub fn new(
        id: i64,
        major: Option<&str>,
        city: Option<&str>,
        graduation_year: i32,
    ) -> Self {
        Self {
            id,
            major: major.map(str::to_string),
            city: city.map(str::to_string),
            graduation_year,
        }
    }
}
