use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// A stored account. Deliberately not `Serialize`: the password hash must
/// only ever leave through [`UserProfile`], which drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<String>,
}

/// Fields for a new account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Full replacement of the editable profile fields
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

impl User {
    pub fn from_new(new: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            email: new.email,
            birthday: new.birthday,
            favorite_movies: Vec::new(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(rename = "FavoriteMovies")]
    pub favorite_movies: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            birthday: user.birthday,
            favorite_movies: user.favorite_movies.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birthday: user.birthday,
            favorite_movies: user.favorite_movies,
        }
    }
}
