use serde::Deserialize;

/// A TMDB search hit offered to the user before anything is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub title: String,
    /// Raw release date as TMDB reports it, possibly empty.
    pub year: String,
    pub external_id: i32,
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: f64,
    pub ranking: i32,
    pub review: String,
    pub img_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub movie_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct FindQuery {
    pub id: i32,
    #[serde(default)]
    pub poster: String,
}
