use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Director {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Bio", default)]
    pub bio: String,
}

/// A catalog entry. Movies are seeded in bulk and read-only over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id", default = "generate_movie_id")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Genre", default)]
    pub genre: Genre,
    #[serde(rename = "Director", default)]
    pub director: Director,
    #[serde(rename = "Actors", default)]
    pub actors: Vec<String>,
    #[serde(rename = "ImagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(rename = "Featured", default)]
    pub featured: bool,
}

fn generate_movie_id() -> String {
    Uuid::new_v4().simple().to_string()
}
