//! Content-based alumni recommendations.
//!
//! Each profile is rendered as a short feature document (major, city,
//! graduation year), the batch is embedded in a TF-IDF space, and candidates
//! are ranked by cosine similarity to the target. Everything is recomputed per
//! call; nothing is cached between requests.

pub mod config;
pub mod feature;
pub mod similarity;
pub mod stopwords;
pub mod tfidf;
pub mod tokenizer;

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::Profile;

pub use config::{RecommenderConfig, load_config_from_env};
pub use feature::{FeatureDocument, build_feature_documents};
pub use similarity::SimilarityMatrix;
pub use tfidf::{SparseVector, TfidfSpace};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    #[error("profile {target_id} is not part of the candidate batch")]
    NotFound { target_id: i64 },
}

/// A recommended profile id and its similarity to the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProfile {
    pub id: i64,
    pub score: f64,
}

/// Ids of the `top_k` profiles most similar to `target_id`, best first.
///
/// See [`rank`] for the exact contract.
pub fn recommend(
    target_id: i64,
    profiles: &[Profile],
    top_k: usize,
) -> Result<Vec<i64>, RecommendError> {
    Ok(rank(target_id, profiles, top_k)?
        .into_iter()
        .map(|scored| scored.id)
        .collect())
}

/// Ranks `profiles` by similarity to the profile whose id is `target_id`.
///
/// - fewer than two distinct ids in the batch: `Ok` with no results
/// - `target_id` absent: [`RecommendError::NotFound`]
/// - otherwise at most `top_k` entries, ordered by descending score with ties
///   kept in batch order; the target never appears in its own results
#[instrument(skip(profiles), fields(batch = profiles.len()))]
pub fn rank(
    target_id: i64,
    profiles: &[Profile],
    top_k: usize,
) -> Result<Vec<ScoredProfile>, RecommendError> {
    let distinct = profiles.iter().map(|p| p.id).collect::<HashSet<_>>().len();
    if distinct < 2 {
        debug!(distinct, "not enough profiles to compare");
        return Ok(Vec::new());
    }

    let target_index = profiles
        .iter()
        .position(|p| p.id == target_id)
        .ok_or(RecommendError::NotFound { target_id })?;

    if top_k == 0 {
        return Ok(Vec::new());
    }

    let documents = build_feature_documents(profiles);
    let space = TfidfSpace::fit(&documents);

    let mut ranked: Vec<ScoredProfile> = space
        .similarities_to(target_index)
        .into_iter()
        .zip(profiles)
        .filter(|(_, profile)| profile.id != target_id)
        .map(|(score, profile)| ScoredProfile {
            id: profile.id,
            score,
        })
        .collect();

    // sort_by is stable: equal scores keep batch order.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(top_k);

    debug!(returned = ranked.len(), "ranked candidates");
    Ok(ranked)
}
