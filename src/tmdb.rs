use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::error::AppResult;

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    access_token: Option<String>,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        access_token: Option<String>,
        base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.is_none() && access_token.is_none() {
            tracing::warn!("no TMDB_API_KEY or TMDB_ACCESS_TOKEN provided, lookups will be rejected");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, api_key, access_token, base_url, limiter }
    }

    /// Results come back in TMDB's relevance order.
    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchMovie>> {
        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let req = self.client.get(url).query(&[("query", query)]);

        let resp: SearchResponse = self.send(req).await?.json().await?;
        tracing::debug!(query, results = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }

    pub async fn fetch_by_id(&self, tmdb_id: i32) -> AppResult<MovieDetails> {
        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), tmdb_id);
        let req = self.client.get(url);

        let details: MovieDetails = self.send(req).await?.json().await?;
        tracing::debug!(tmdb_id, title = %details.original_title, "tmdb movie details");
        Ok(details)
    }

    async fn send(&self, mut req: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        self.limiter.until_ready().await;

        if let Some(key) = &self.api_key {
            req = req.query(&[("api_key", key)]);
        }
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        // TMDB error bodies are JSON too; reject them before they reach the decoder.
        Ok(req.send().await?.error_for_status()?)
    }
}

#[derive(Clone, Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchMovie>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchMovie {
    pub id: i32,
    pub original_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MovieDetails {
    pub original_title: String,
    pub release_date: String,
    pub overview: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    use super::*;
    use crate::error::AppError;

    pub(crate) fn client_for(server: &MockServer) -> TmdbClient {
        TmdbClient::new(
            reqwest::Client::new(),
            Some("test-key".to_string()),
            None,
            server.uri(),
            100,
        )
    }

    #[tokio::test]
    async fn search_sends_query_and_key_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "alien"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [
                    { "id": 348, "original_title": "Alien", "release_date": "1979-05-25", "poster_path": "/alien.jpg" },
                    { "id": 679, "original_title": "Aliens", "release_date": "", "poster_path": null },
                    { "id": 8077, "original_title": "Alien³" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server).search("alien").await.unwrap();

        let ids: Vec<_> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, [348, 679, 8077]);
        assert_eq!(results[0].poster_path.as_deref(), Some("/alien.jpg"));
        assert_eq!(results[1].poster_path, None);
        assert_eq!(results[2].release_date, None);
    }

    #[tokio::test]
    async fn bearer_token_is_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            TmdbClient::new(reqwest::Client::new(), None, Some("tok".to_string()), server.uri(), 100);
        assert!(client.search("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_a_lookup_failure_not_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status_code": 7,
                "status_message": "Invalid API key",
                "results": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).search("alien").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalLookupFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn fetch_by_id_parses_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/348"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 348,
                "original_title": "Alien",
                "release_date": "1979-05-25",
                "overview": "In space no one can hear you scream."
            })))
            .mount(&server)
            .await;

        let details = client_for(&server).fetch_by_id(348).await.unwrap();
        assert_eq!(details.original_title, "Alien");
        assert_eq!(details.release_date, "1979-05-25");
    }

    #[tokio::test]
    async fn fetch_by_id_missing_fields_is_a_lookup_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/348"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 348 })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_id(348).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalLookupFailed(_)), "{err:?}");
    }
}
