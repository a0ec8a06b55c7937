use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{FindQuery, IdQuery, ReviewRequest, SearchRequest},
    templates,
};

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let mut movies = state.catalog.list_ranked().await?;
    movies.sort_by_key(|m| m.ranking);
    Ok(Html(templates::list_page(&movies)))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page(None))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(req): Form<SearchRequest>,
) -> AppResult<Response> {
    match state.catalog.search_by_title(&req.movie_name).await {
        Ok(candidates) => {
            Ok(Html(templates::select_page(req.movie_name.trim(), &candidates)).into_response())
        },
        Err(AppError::InvalidInput(msg)) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(templates::add_page(Some(&msg))))
                .into_response())
        },
        Err(err) => Err(err),
    }
}

pub async fn find(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FindQuery>,
) -> AppResult<Redirect> {
    let id = state.catalog.create_from_search_selection(q.id, &q.poster).await?;
    Ok(Redirect::to(&format!("/edit?id={id}")))
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
) -> AppResult<Html<String>> {
    let movie = state.catalog.get(q.id).await?;
    Ok(Html(templates::edit_page(&movie, None)))
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
    Form(req): Form<ReviewRequest>,
) -> AppResult<Response> {
    let movie = state.catalog.get(q.id).await?;

    match state.catalog.update_review(movie.id, &req.rating, &req.review).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(AppError::InvalidInput(msg)) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(templates::edit_page(&movie, Some(&msg))))
                .into_response())
        },
        Err(err) => Err(err),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    state.catalog.delete_record(q.id).await?;
    Ok(Redirect::to("/"))
}
