pub mod db;
pub mod movies;
