use async_trait::async_trait;
use thiserror::Error;

use crate::config::FavoritesPolicy;
use crate::database::models::{Director, Genre, Movie, NewUser, User, UserUpdate};

/// Errors from a [`Store`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write; carries the conflicting Username
    #[error("{0} already exists")]
    Conflict(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for the movie catalog and user accounts.
///
/// Every operation is one logical read or write. Username uniqueness is the
/// store's responsibility: `insert_user` and `update_user` must be atomic with
/// respect to concurrent writers and report clashes as [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError>;

    async fn movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError>;

    /// Genre of the first movie whose genre has this name
    async fn genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError>;

    /// Director of the first movie whose director has this name
    async fn director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError>;

    /// Bulk insert; movies whose id already exists are skipped. Returns the number inserted.
    async fn insert_movies(&self, movies: Vec<Movie>) -> Result<u64, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert-if-absent on Username
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Replace profile fields of `username`. `Ok(None)` when no such user.
    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError>;

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
        policy: FavoritesPolicy,
    ) -> Result<Option<User>, StoreError>;

    /// Remove every occurrence of `movie_id` from the user's favorites
    async fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<User>, StoreError>;

    /// Returns false when there was nothing to delete
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;
}
