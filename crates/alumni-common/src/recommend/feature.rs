use crate::Profile;

/// Text form of a profile fed into the vector space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDocument {
    pub profile_id: i64,
    pub text: String,
}

impl FeatureDocument {
    /// `major city year`, with missing fields rendered as empty strings so no
    /// placeholder word ever reaches the vocabulary.
    pub fn from_profile(profile: &Profile) -> Self {
        let major = profile.major.as_deref().unwrap_or("").trim();
        let city = profile.city.as_deref().unwrap_or("").trim();

        Self {
            profile_id: profile.id,
            text: format!("{major} {city} {}", profile.graduation_year),
        }
    }
}

/// One document per profile, in batch order.
pub fn build_feature_documents(profiles: &[Profile]) -> Vec<FeatureDocument> {
    profiles.iter().map(FeatureDocument::from_profile).collect()
}
