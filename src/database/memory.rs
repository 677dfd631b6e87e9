use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::FavoritesPolicy;
use crate::database::models::{Director, Genre, Movie, NewUser, User, UserUpdate};
use crate::database::store::{Store, StoreError};

/// In-process store. Each collection sits behind its own lock, so the
/// check-then-write in `insert_user` happens under one write guard.
#[derive(Default)]
pub struct MemoryStore {
    movies: RwLock<Vec<Movie>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            movies: RwLock::new(movies),
            users: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.movies.read().await.clone())
    }

    async fn movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.title == title).cloned())
    }

    async fn genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.genre.name == name).map(|m| m.genre.clone()))
    }

    async fn director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError> {
        let movies = self.movies.read().await;
        Ok(movies
            .iter()
            .find(|m| m.director.name == name)
            .map(|m| m.director.clone()))
    }

    async fn insert_movies(&self, incoming: Vec<Movie>) -> Result<u64, StoreError> {
        let mut movies = self.movies.write().await;
        let mut inserted = 0;
        for movie in incoming {
            if movies.iter().any(|m| m.id == movie.id) {
                continue;
            }
            movies.push(movie);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict(new.username));
        }

        let user = User::from_new(new);
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| u.username == username) else {
            return Ok(None);
        };

        if update.username != username && users.iter().any(|u| u.username == update.username) {
            return Err(StoreError::Conflict(update.username));
        }

        let user = &mut users[index];
        user.username = update.username;
        user.password_hash = update.password_hash;
        user.email = update.email;
        user.birthday = update.birthday;
        Ok(Some(user.clone()))
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
        policy: FavoritesPolicy,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        let Some(user) = users.iter_mut().find(|u| u.username == username) else {
            return Ok(None);
        };

        let present = user.favorite_movies.iter().any(|id| id == movie_id);
        if policy == FavoritesPolicy::Append || !present {
            user.favorite_movies.push(movie_id.to_string());
        }
        Ok(Some(user.clone()))
    }

    async fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        let Some(user) = users.iter_mut().find(|u| u.username == username) else {
            return Ok(None);
        };

        user.favorite_movies.retain(|id| id != movie_id);
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.username != username);
        Ok(users.len() != before)
    }
}
