//! User similarity and rating prediction.
//!
//! Pure functions over in-memory rating snapshots. Nothing here touches the
//! database, the session store or the logger.

use std::collections::HashMap;
use std::hash::Hash;

/// Integer score a user gave an item
pub type Score = i32;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionError {
    /// No rater with a positive similarity to the target user
    #[error("no comparable raters")]
    NoComparableRaters,
}

/// A candidate rating on the item being predicted: the rater's full rating
/// history and the score they gave the item.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a, K> {
    pub rater_ratings: &'a [(K, Score)],
    pub score: Score,
}

/// Pearson correlation of paired scores.
///
/// Returns 0.0 for an empty slice and when either side has zero variance.
pub fn pearson(pairs: &[(Score, Score)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_x_sq, mut sum_y_sq, mut sum_xy) = (0.0, 0.0, 0.0, 0.0, 0.0);

    for &(x, y) in pairs {
        let (x, y) = (f64::from(x), f64::from(y));
        sum_x += x;
        sum_y += y;
        sum_x_sq += x * x;
        sum_y_sq += y * y;
        sum_xy += x * y;
    }

    let var_x = sum_x_sq - sum_x * sum_x / n;
    let var_y = sum_y_sq - sum_y * sum_y / n;

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    let numerator = sum_xy - sum_x * sum_y / n;
    (numerator / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Similarity between two users from the items both of them rated.
pub fn similarity<K: Eq + Hash + Copy>(user: &[(K, Score)], other: &[(K, Score)]) -> f64 {
    let user_scores: HashMap<K, Score> = user.iter().copied().collect();

    let pairs: Vec<(Score, Score)> = other
        .iter()
        .filter_map(|(item, other_score)| {
            user_scores
                .get(item)
                .map(|user_score| (*user_score, *other_score))
        })
        .collect();

    pearson(&pairs)
}

/// Similarity-weighted average of `(similarity, score)` pairs.
///
/// Pairs with a similarity of zero or below are dropped before averaging.
pub fn weighted_average<I>(weighted: I) -> Result<f64, PredictionError>
where
    I: IntoIterator<Item = (f64, Score)>,
{
    let positive: Vec<(f64, Score)> = weighted
        .into_iter()
        .filter(|(similarity, _)| *similarity > 0.0)
        .collect();

    let total: f64 = positive.iter().map(|(similarity, _)| similarity).sum();
    if positive.is_empty() || total <= 0.0 {
        return Err(PredictionError::NoComparableRaters);
    }

    Ok(positive
        .iter()
        .map(|(similarity, score)| similarity / total * f64::from(*score))
        .sum())
}

/// Similarity of the target user to each candidate, in candidate order.
pub fn candidate_similarities<K: Eq + Hash + Copy>(
    target: &[(K, Score)],
    candidates: &[Candidate<'_, K>],
) -> Vec<f64> {
    candidates
        .iter()
        .map(|candidate| similarity(target, candidate.rater_ratings))
        .collect()
}

/// Predicts the target user's score for an item from the other ratings on it.
pub fn predict_rating<K: Eq + Hash + Copy>(
    target: &[(K, Score)],
    candidates: &[Candidate<'_, K>],
) -> Result<f64, PredictionError> {
    let similarities = candidate_similarities(target, candidates);
    weighted_average(
        similarities
            .into_iter()
            .zip(candidates.iter().map(|candidate| candidate.score)),
    )
}
