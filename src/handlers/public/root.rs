// handlers/public/root.rs - GET / handler

pub const WELCOME_MESSAGE: &str = "Welcome to movie gallery!";

pub async fn root() -> &'static str {
    WELCOME_MESSAGE
}
