// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which puts an
// `AuthUser` into the request extensions. Handlers that write to an account
// additionally go through `users::authorize_write`.

pub mod favorites;
pub mod movies;
pub mod users;
