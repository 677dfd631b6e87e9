use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Map};

use crate::cli::utils::{open_pg_store, output_success};
use crate::cli::OutputFormat;
use crate::database::models::Movie;
use crate::database::Store;

#[derive(Subcommand)]
pub enum MovieCommands {
    #[command(about = "Import a JSON array of movies; existing ids are skipped")]
    Import {
        #[arg(help = "Path to a JSON file holding an array of movies")]
        file: PathBuf,
    },

    #[command(about = "Print the catalog")]
    List,
}

pub async fn handle(cmd: MovieCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MovieCommands::Import { file } => {
            let movies = read_movies(&file)?;
            let total = movies.len();

            let store = open_pg_store().await?;
            let inserted = store.insert_movies(movies).await?;
            store.close().await;

            let skipped = (total as u64).saturating_sub(inserted);
            tracing::info!("Imported {} of {} movies from {}", inserted, total, file.display());

            let mut data = Map::new();
            data.insert("inserted".into(), json!(inserted));
            data.insert("skipped".into(), json!(skipped));
            output_success(
                output_format,
                &format!("Imported {} movies ({} already present)", inserted, skipped),
                Some(data),
            )
        }
        MovieCommands::List => {
            let store = open_pg_store().await?;
            let movies = store.list_movies().await?;
            store.close().await;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&movies)?),
                OutputFormat::Text => {
                    if movies.is_empty() {
                        println!("No movies in the catalog");
                    }
                    for movie in &movies {
                        println!("{}  {}  [{}]", movie.id, movie.title, movie.genre.name);
                    }
                }
            }
            Ok(())
        }
    }
}

fn read_movies(path: &Path) -> anyhow::Result<Vec<Movie>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_movies(&raw).with_context(|| format!("{} is not a JSON array of movies", path.display()))
}

fn parse_movies(raw: &str) -> anyhow::Result<Vec<Movie>> {
    let movies: Vec<Movie> = serde_json::from_str(raw)?;
    Ok(movies)
}
