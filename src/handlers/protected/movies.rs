// handlers/protected/movies.rs - read-only catalog queries

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::database::models::{Director, Genre, Movie};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /movies
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = state.store.list_movies().await?;
    tracing::debug!("Listing {} movies", movies.len());
    Ok(Json(movies))
}

/// GET /movies/:title - exact title match; an unknown title is `null`, not 404
pub async fn movie_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Option<Movie>>, ApiError> {
    let movie = state.store.movie_by_title(&title).await?;
    Ok(Json(movie))
}

/// GET /genre/:name
pub async fn genre_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Genre>, ApiError> {
    state
        .store
        .genre_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Genre {} was not found", name)))
}

/// GET /director/:name
pub async fn director_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Director>, ApiError> {
    state
        .store
        .director_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Director {} was not found", name)))
}
