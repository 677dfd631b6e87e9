mod common;

use anyhow::Result;
use axum::http::StatusCode;
use reels_api::auth::verify_password;
use reels_api::database::Store;
use serde_json::json;

use common::{user_body, TestApp, PASSWORD};

#[tokio::test]
async fn short_username_is_a_validation_error() -> Result<()> {
    let app = TestApp::new();

    let res = app.register("al").await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = res.json()?;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["param"], "Username");
    assert_eq!(errors[0]["location"], "body");
    assert!(app.store.list_users().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_fields_are_all_reported() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post("/users", None, Some(json!({ "Username": "bad name!", "Email": "nope" })))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let params: Vec<String> = res.json()?["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(params, vec!["Username", "Password", "Email"]);
    Ok(())
}

#[tokio::test]
async fn null_and_mistyped_fields_are_field_errors() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post("/users", None, Some(json!({ "Username": "alice1", "Password": null, "Email": "a@x.com" })))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json()?,
        json!({ "errors": [{ "location": "body", "param": "Password", "msg": "Password is required" }] })
    );

    let res = app
        .post("/users", None, Some(json!({ "Username": 12345, "Password": "pw", "Email": "a@x.com" })))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json()?["errors"][0]["param"], "Username");

    let token = app.register_and_login("bobby2").await?;
    let res = app
        .put("/users/bobby2", Some(&token), json!({ "Username": "bobby2", "Password": "pw", "Email": null }))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json()?["errors"][0]["param"], "Email");

    assert_eq!(app.store.list_users().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn registration_hashes_the_password() -> Result<()> {
    let app = TestApp::new();

    let res = app.register("alice1").await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let body = res.json()?;
    assert_eq!(body["Username"], "alice1");
    assert_eq!(body["Email"], "alice1@example.com");
    assert_eq!(body["Birthday"], "1990-05-17");
    assert_eq!(body["FavoriteMovies"], json!([]));
    assert!(body.get("Password").is_none());

    let stored = app.store.user_by_username("alice1").await?.unwrap();
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(verify_password(PASSWORD, &stored.password_hash));
    assert!(!verify_password("p@ssW0rd!", &stored.password_hash));
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> Result<()> {
    let app = TestApp::new();

    assert_eq!(app.register("alice1").await?.status, StatusCode::CREATED);

    let res = app.register("alice1").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), "alice1 already exists");
    Ok(())
}

#[tokio::test]
async fn concurrent_registration_admits_one() -> Result<()> {
    let app = TestApp::new();

    let (first, second) = tokio::join!(app.register("alice1"), app.register("alice1"));
    let mut statuses = vec![first?.status, second?.status];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(app.store.list_users().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn list_and_fetch_profiles() -> Result<()> {
    let app = TestApp::new();
    let token = app.register_and_login("alice1").await?;
    app.register("bobby2").await?;

    let res = app.get("/users", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let users = res.json()?;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(!res.text().contains("Password"));

    let res = app.get("/users/bobby2", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()?["Username"], "bobby2");

    let res = app.get("/users/nobody1", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_replaces_profile_and_rehashes() -> Result<()> {
    let app = TestApp::new();
    let token = app.register_and_login("alice1").await?;

    let res = app
        .put(
            "/users/alice1",
            Some(&token),
            json!({ "Username": "alice1", "Password": "n3wPassw0rd", "Email": "alice@new.example" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["Email"], "alice@new.example");
    assert!(body.get("Birthday").is_none());

    let stored = app.store.user_by_username("alice1").await?.unwrap();
    assert!(verify_password("n3wPassw0rd", &stored.password_hash));

    assert_eq!(app.login("alice1", PASSWORD).await?.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("alice1", "n3wPassw0rd").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn update_rules() -> Result<()> {
    let app = TestApp::new();
    let token = app.register_and_login("alice1").await?;
    app.register("bobby2").await?;

    let res = app.put("/users/alice1", Some(&token), json!({ "Username": "al" })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.put("/users/alice1", Some(&token), user_body("bobby2")).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.put("/users/bobby2", Some(&token), user_body("bobby2")).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.put("/users/nobody1", Some(&token), user_body("nobody1")).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deregistration() -> Result<()> {
    let app = TestApp::new();
    let token = app.register_and_login("alice1").await?;
    app.register("bobby2").await?;

    let res = app.delete("/users/nobody1", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), "nobody1 was not found");

    let res = app.delete("/users/bobby2", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(app.store.user_by_username("bobby2").await?.is_some());

    let res = app.delete("/users/alice1", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "alice1 was deleted.");
    assert!(app.store.user_by_username("alice1").await?.is_none());

    let bob = {
        let res = app.login("bobby2", PASSWORD).await?;
        res.json()?["token"].as_str().unwrap().to_string()
    };
    let res = app.get("/users/alice1", Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
