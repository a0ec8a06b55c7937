mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod store;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{catalog::Catalog, config::Config, store::MovieStore, tmdb::TmdbClient};

pub struct AppState {
    pub catalog: Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movieshelf=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("movieshelf/0.1")
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    let catalog =
        Catalog::new(MovieStore::new(db), Arc::new(tmdb), config.tmdb_image_base_url.clone());
    let state = Arc::new(AppState { catalog });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/add", get(routes::add_form).post(routes::search))
        .route("/find", get(routes::find))
        .route("/edit", get(routes::edit_form).post(routes::edit))
        .route("/delete", get(routes::delete).post(routes::delete))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::store::tests::new_movie;

    async fn setup(server: &MockServer) -> (Router, MovieStore) {
        let store = MovieStore::new(db::memory().await);
        let catalog = Catalog::new(
            store.clone(),
            Arc::new(tmdb::tests::client_for(server)),
            "https://image.tmdb.org/t/p/original".to_string(),
        );
        (app(Arc::new(AppState { catalog })), store)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn index_renders_in_rank_order_and_persists_ranks() {
        let server = MockServer::start().await;
        let (app, store) = setup(&server).await;
        let low = store.insert(new_movie("Low Movie", 3.0)).await.unwrap();
        store.insert(new_movie("High Movie", 9.0)).await.unwrap();

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        let high_at = body.find("High Movie").unwrap();
        let low_at = body.find("Low Movie").unwrap();
        assert!(high_at < low_at);
        assert_eq!(store.get(low).await.unwrap().ranking, 2);
    }

    #[tokio::test]
    async fn search_lists_candidates_with_find_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "id": 348, "original_title": "Alien", "release_date": "1979-05-25", "poster_path": "/alien.jpg" }
                ]
            })))
            .mount(&server)
            .await;
        let (app, _) = setup(&server).await;

        let response = app.oneshot(form("/add", "movie_name=alien")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Alien - 1979-05-25"));
        assert!(body.contains("/find?id=348&amp;poster=%2Falien.jpg"));
    }

    #[tokio::test]
    async fn search_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let (app, _) = setup(&server).await;

        let response = app.oneshot(form("/add", "movie_name=alien")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn find_creates_and_redirects_to_edit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/348"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "original_title": "Alien",
                "release_date": "1979-05-25",
                "overview": "Space."
            })))
            .mount(&server)
            .await;
        let (app, store) = setup(&server).await;

        let response = app.oneshot(get("/find?id=348&poster=%2Falien.jpg")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let created = store.all().await.unwrap();
        assert_eq!(created.len(), 1);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, format!("/edit?id={}", created[0].id));
    }

    #[tokio::test]
    async fn edit_missing_movie_is_not_found() {
        let server = MockServer::start().await;
        let (app, _) = setup(&server).await;

        let response = app.oneshot(get("/edit?id=999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn edit_with_bad_rating_rerenders_form() {
        let server = MockServer::start().await;
        let (app, store) = setup(&server).await;
        let id = store.insert(new_movie("Heat", 8.0)).await.unwrap();

        let response =
            app.oneshot(form(&format!("/edit?id={id}"), "rating=ten&review=good")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_string(response).await.contains("rating must be a number"));
        assert_eq!(store.get(id).await.unwrap().rating, 8.0);
    }

    #[tokio::test]
    async fn edit_missing_field_rerenders_form() {
        let server = MockServer::start().await;
        let (app, store) = setup(&server).await;
        let id = store.insert(new_movie("Heat", 8.0)).await.unwrap();

        let response = app.oneshot(form(&format!("/edit?id={id}"), "rating=7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_string(response).await;
        assert!(body.contains("a review is required"));
        assert!(body.contains("<form"));
        assert_eq!(store.get(id).await.unwrap().rating, 8.0);
    }

    #[tokio::test]
    async fn search_without_title_rerenders_form() {
        let server = MockServer::start().await;
        let (app, _) = setup(&server).await;

        let response = app.oneshot(form("/add", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_string(response).await.contains("a movie title is required"));
    }

    #[tokio::test]
    async fn edit_then_delete() {
        let server = MockServer::start().await;
        let (app, store) = setup(&server).await;
        let id = store.insert(new_movie("Heat", 8.0)).await.unwrap();

        let response = app
            .clone()
            .oneshot(form(&format!("/edit?id={id}"), "rating=7.5&review=Great+film"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let movie = store.get(id).await.unwrap();
        assert_eq!((movie.rating, movie.review.as_str()), (7.5, "Great film"));

        let response = app.clone().oneshot(get(&format!("/delete?id={id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(store.all().await.unwrap().is_empty());

        let response = app.oneshot(get(&format!("/delete?id={id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
