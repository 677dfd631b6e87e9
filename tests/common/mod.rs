#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use reels_api::{
    app,
    config::AppConfig,
    database::{
        models::{Director, Genre, Movie},
        MemoryStore,
    },
    state::AppState,
};

pub const PASSWORD: &str = "p@ssW0rd";

/// The router built in-process over a seeded memory store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body)
            .with_context(|| format!("response body is not JSON: {:?}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_testing())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::with_movies(seed_movies()));
        let state = AppState::new(config, store.clone());
        let router = app::router(state.clone());
        Self { router, store, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, body).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, username: &str) -> Result<TestResponse> {
        self.post("/users", None, Some(user_body(username))).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TestResponse> {
        self.post(
            "/login",
            None,
            Some(json!({ "Username": username, "Password": password })),
        )
        .await
    }

    /// Register `username` with [`PASSWORD`] and return a bearer token for it
    pub async fn register_and_login(&self, username: &str) -> Result<String> {
        let res = self.register(username).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {} {}", res.status, res.text());

        let res = self.login(username, PASSWORD).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.text());

        let token = res.json()?["token"]
            .as_str()
            .context("login response has no token")?
            .to_string();
        Ok(token)
    }
}

/// Drive any router, including ones built over a custom store
pub async fn send(router: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(TestResponse { status, headers, body })
}

pub fn user_body(username: &str) -> Value {
    json!({
        "Username": username,
        "Password": PASSWORD,
        "Email": format!("{}@example.com", username),
        "Birthday": "1990-05-17"
    })
}

pub fn seed_movies() -> Vec<Movie> {
    vec![
        movie("m1", "Alien", "Horror", "Ridley Scott"),
        movie("m2", "Blade Runner", "Science Fiction", "Ridley Scott"),
        movie("m3", "Heat", "Crime", "Michael Mann"),
    ]
}

fn movie(id: &str, title: &str, genre: &str, director: &str) -> Movie {
    Movie {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        genre: Genre {
            name: genre.to_string(),
            description: format!("{} films", genre),
        },
        director: Director {
            name: director.to_string(),
            bio: format!("{} bio", director),
        },
        actors: Vec::new(),
        image_path: None,
        featured: false,
    }
}
