use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::{DatabaseConfig, FavoritesPolicy};
use crate::database::models::{Director, Genre, Movie, NewUser, User, UserUpdate};
use crate::database::store::{Store, StoreError};

/// Tables and indexes; every statement is idempotent
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        genre       JSONB NOT NULL DEFAULT '{}'::jsonb,
        director    JSONB NOT NULL DEFAULT '{}'::jsonb,
        actors      TEXT[] NOT NULL DEFAULT '{}',
        image_path  TEXT,
        featured    BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS movies_title_idx ON movies (title)",
    "CREATE INDEX IF NOT EXISTS movies_genre_name_idx ON movies ((genre->>'Name'))",
    "CREATE INDEX IF NOT EXISTS movies_director_name_idx ON movies ((director->>'Name'))",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              UUID PRIMARY KEY,
        username        TEXT NOT NULL,
        password        TEXT NOT NULL,
        email           TEXT NOT NULL,
        birthday        DATE,
        favorite_movies TEXT[] NOT NULL DEFAULT '{}',
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users (username)",
];

const MOVIE_COLUMNS: &str =
    "id, title, description, genre, director, actors, image_path, featured";
const USER_COLUMNS: &str = "id, username, password, email, birthday, favorite_movies";

#[derive(FromRow)]
struct MovieRow {
    id: String,
    title: String,
    description: String,
    genre: Json<Genre>,
    director: Json<Director>,
    actors: Vec<String>,
    image_path: Option<String>,
    featured: bool,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            genre: row.genre.0,
            director: row.director.0,
            actors: row.actors,
            image_path: row.image_path,
            featured: row.featured,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password: String,
    email: String,
    birthday: Option<NaiveDate>,
    favorite_movies: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            email: row.email,
            birthday: row.birthday,
            favorite_movies: row.favorite_movies,
        }
    }
}

/// PostgreSQL-backed store over a single shared pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build a lazily-connecting pool. Nothing touches the network until the
    /// first query, so an unreachable database does not stop startup.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if config.url.is_empty() {
            return Err(StoreError::ConfigMissing("CONNECTION_URI"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&config.url)?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_unique_violation(err: sqlx::Error, username: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(username.to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies ORDER BY title", MOVIE_COLUMNS);
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies WHERE title = $1 LIMIT 1", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        let genre: Option<Json<Genre>> =
            sqlx::query_scalar("SELECT genre FROM movies WHERE genre->>'Name' = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(genre.map(|g| g.0))
    }

    async fn director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError> {
        let director: Option<Json<Director>> =
            sqlx::query_scalar("SELECT director FROM movies WHERE director->>'Name' = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(director.map(|d| d.0))
    }

    async fn insert_movies(&self, movies: Vec<Movie>) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for movie in movies {
            let result = sqlx::query(
                r#"
                INSERT INTO movies (id, title, description, genre, director, actors, image_path, featured)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&movie.id)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(Json(&movie.genre))
            .bind(Json(&movie.director))
            .bind(&movie.actors)
            .bind(&movie.image_path)
            .bind(movie.featured)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        // The unique index turns a concurrent duplicate into "no row returned"
        let sql = format!(
            r#"
            INSERT INTO users (id, username, password, email, birthday)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(&new.email)
            .bind(new.birthday)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::from)
            .ok_or(StoreError::Conflict(new.username))
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = $2, password = $3, email = $4, birthday = $5
            WHERE username = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(&update.username)
            .bind(&update.password_hash)
            .bind(&update.email)
            .bind(update.birthday)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &update.username))?;
        Ok(row.map(User::from))
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
        policy: FavoritesPolicy,
    ) -> Result<Option<User>, StoreError> {
        let assignment = match policy {
            FavoritesPolicy::Unique => {
                "CASE WHEN $2 = ANY(favorite_movies) THEN favorite_movies \
                 ELSE array_append(favorite_movies, $2) END"
            }
            FavoritesPolicy::Append => "array_append(favorite_movies, $2)",
        };
        let sql = format!(
            "UPDATE users SET favorite_movies = {} WHERE username = $1 RETURNING {}",
            assignment, USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET favorite_movies = array_remove(favorite_movies, $2) \
             WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statements_are_idempotent() {
        for statement in SCHEMA {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "non-idempotent statement: {}",
                statement
            );
        }
    }

    #[test]
    fn lazy_pool_requires_url() {
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            connection_timeout: 1,
        };
        assert!(matches!(
            PgStore::connect_lazy(&config),
            Err(StoreError::ConfigMissing("CONNECTION_URI"))
        ));
    }
}
