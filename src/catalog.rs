use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Candidate, NewMovie},
    store::MovieStore,
    tmdb::TmdbClient,
};

pub const REVIEW_PLACEHOLDER: &str = "type ur review";
pub const MAX_TEXT_LEN: usize = 250;

#[derive(Clone)]
pub struct Catalog {
    store: MovieStore,
    tmdb: Arc<TmdbClient>,
    image_base_url: String,
}

impl Catalog {
    pub fn new(store: MovieStore, tmdb: Arc<TmdbClient>, image_base_url: String) -> Self {
        Self { store, tmdb, image_base_url }
    }

    /// Recomputes every ranking from the current ratings, persists them and
    /// returns all records. This writes on every call, even when nothing moved.
    ///
    /// Records come back in store order (ascending id) with their new
    /// `ranking`; callers wanting rank order must sort.
    pub async fn list_ranked(&self) -> AppResult<Vec<movie::Model>> {
        let mut movies = self.store.all().await?;

        let rankings = assign_rankings(&movies);
        self.store.apply_rankings(&rankings).await?;

        for (movie, (_, ranking)) in movies.iter_mut().zip(&rankings) {
            movie.ranking = *ranking;
        }

        debug!(count = movies.len(), "rankings recomputed");
        Ok(movies)
    }

    pub async fn search_by_title(&self, query: &str) -> AppResult<Vec<Candidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid("a movie title is required"));
        }

        let results = self.tmdb.search(query).await?;
        Ok(results
            .into_iter()
            .map(|m| Candidate {
                title: m.original_title,
                year: m.release_date.unwrap_or_default(),
                external_id: m.id,
                poster_path: m.poster_path.filter(|p| !p.trim().is_empty()),
            })
            .collect())
    }

    pub async fn create_from_search_selection(
        &self,
        external_id: i32,
        poster_path: &str,
    ) -> AppResult<i32> {
        let poster_path = poster_path.trim();
        if poster_path.is_empty() {
            return Err(AppError::invalid("a poster is required to add a movie"));
        }

        let details = self.tmdb.fetch_by_id(external_id).await?;
        let year = release_year(&details.release_date)?;

        let new = NewMovie {
            title: details.original_title,
            year,
            description: bounded(&details.overview),
            rating: 0.0,
            ranking: 0,
            review: REVIEW_PLACEHOLDER.to_string(),
            img_url: join_url(&self.image_base_url, poster_path),
        };
        let title = new.title.clone();

        let id = self.store.insert(new).await?;
        info!(id, external_id, %title, "movie added");
        Ok(id)
    }

    pub async fn get(&self, id: i32) -> AppResult<movie::Model> {
        self.store.get(id).await
    }

    /// A missing id is `NotFound` before the input is looked at. Leaves
    /// `ranking` alone; the next `list_ranked` picks up the new rating.
    pub async fn update_review(&self, id: i32, rating: &str, review: &str) -> AppResult<()> {
        self.store.get(id).await?;

        let rating = parse_rating(rating)?;
        let review = review.trim();
        if review.is_empty() {
            return Err(AppError::invalid("a review is required"));
        }

        self.store.update_review(id, rating, review).await?;
        info!(id, rating, "review updated");
        Ok(())
    }

    pub async fn delete_record(&self, id: i32) -> AppResult<()> {
        self.store.delete(id).await?;
        info!(id, "movie deleted");
        Ok(())
    }
}

/// Pairs each record's id with its 1-based position by descending rating.
/// The sort is stable, so equal ratings keep their input order.
pub fn assign_rankings(movies: &[movie::Model]) -> Vec<(i32, i32)> {
    let mut order: Vec<usize> = (0..movies.len()).collect();
    order.sort_by(|&a, &b| movies[b].rating.total_cmp(&movies[a].rating));

    let mut rankings = vec![0; movies.len()];
    for (position, &index) in order.iter().enumerate() {
        rankings[index] = position as i32 + 1;
    }

    movies.iter().zip(rankings).map(|(m, r)| (m.id, r)).collect()
}

fn release_year(release_date: &str) -> AppResult<i32> {
    let year = release_date.split('-').next().unwrap_or_default().trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::lookup(format!("malformed release date {release_date:?}")));
    }
    year.parse().map_err(|_| AppError::lookup(format!("malformed release date {release_date:?}")))
}

fn parse_rating(raw: &str) -> AppResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(rating) if rating.is_finite() => Ok(rating),
        _ => Err(AppError::invalid(format!("rating must be a number, got {raw:?}"))),
    }
}

fn bounded(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.chars().take(MAX_TEXT_LEN).collect())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
