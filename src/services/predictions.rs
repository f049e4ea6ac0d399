use serde::Serialize;

use crate::{
    db::RatingsRepository,
    error::{AppError, AppResult},
    models::{MovieId, Rating, Score, UserId},
    services::similarity::{candidate_similarities, weighted_average, Candidate},
};

/// The rater whose taste is closest to the target user's
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarRater {
    pub user_id: UserId,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub movie_id: MovieId,
    pub predicted_score: f64,
    pub most_similar_rater: Option<SimilarRater>,
}

/// Another user's rating on the movie along with everything that user has rated
struct RaterHistory {
    user_id: UserId,
    score: Score,
    ratings: Vec<(MovieId, Score)>,
}

fn movie_scores(ratings: &[Rating]) -> Vec<(MovieId, Score)> {
    ratings.iter().map(Rating::movie_score).collect()
}

/// Loads the rating history of everyone except `user_id` who rated the movie
async fn rater_histories(
    repo: &dyn RatingsRepository,
    user_id: UserId,
    movie_id: MovieId,
) -> AppResult<Vec<RaterHistory>> {
    let mut histories = Vec::new();

    for rating in repo.ratings_for_movie(movie_id).await? {
        if rating.user_id == user_id {
            continue;
        }

        let ratings = repo.ratings_for_user(rating.user_id).await?;
        histories.push(RaterHistory {
            user_id: rating.user_id,
            score: rating.score,
            ratings: movie_scores(&ratings),
        });
    }

    Ok(histories)
}

/// Picks the rater with the highest positive similarity; the earliest one wins ties
fn most_similar_rater(raters: &[RaterHistory], similarities: &[f64]) -> Option<SimilarRater> {
    let mut best: Option<SimilarRater> = None;

    for (rater, &rater_similarity) in raters.iter().zip(similarities) {
        let current = best.as_ref().map_or(0.0, |b| b.similarity);
        if rater_similarity > current {
            best = Some(SimilarRater {
                user_id: rater.user_id,
                similarity: rater_similarity,
            });
        }
    }

    best
}

/// Predicts how `user_id` would score `movie_id` from the other ratings on it
///
/// The user's own rating of the movie, if any, is left out of their history so
/// the prediction is the same before and after they rate.
pub async fn predict_for_user(
    repo: &dyn RatingsRepository,
    user_id: UserId,
    movie_id: MovieId,
) -> AppResult<Prediction> {
    if repo.get_movie(movie_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Movie {} not found", movie_id)));
    }

    let target: Vec<(MovieId, Score)> = movie_scores(&repo.ratings_for_user(user_id).await?)
        .into_iter()
        .filter(|(rated_movie, _)| *rated_movie != movie_id)
        .collect();
    let raters = rater_histories(repo, user_id, movie_id).await?;

    let candidates: Vec<Candidate<'_, MovieId>> = raters
        .iter()
        .map(|rater| Candidate {
            rater_ratings: rater.ratings.as_slice(),
            score: rater.score,
        })
        .collect();

    tracing::debug!(
        user_id,
        movie_id,
        candidate_count = candidates.len(),
        "Predicting rating"
    );

    let similarities = candidate_similarities(&target, &candidates);
    let predicted_score = weighted_average(
        similarities
            .iter()
            .copied()
            .zip(candidates.iter().map(|candidate| candidate.score)),
    )?;

    Ok(Prediction {
        movie_id,
        predicted_score,
        most_similar_rater: most_similar_rater(&raters, &similarities),
    })
}
