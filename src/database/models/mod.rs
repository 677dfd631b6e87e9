pub mod movie;
pub mod user;

pub use movie::{Director, Genre, Movie};
pub use user::{NewUser, User, UserProfile, UserUpdate};
