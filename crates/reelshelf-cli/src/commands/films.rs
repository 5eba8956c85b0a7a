use super::{report_persist_error, spinner, Env};
use crate::output::{films_table, Output};
use crate::{FilmCommands, ItemFields};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use reelshelf_core::{FilmCatalog, WatchOps};
use reelshelf_models::{CatalogItem, FilmDraft, FilmRecord};
use reelshelf_sources::ApiError;
use serde_json::json;
use std::future::Future;

pub async fn run_films(cmd: FilmCommands, env: &Env, output: &Output) -> Result<()> {
    let catalog = FilmCatalog::new(env.film_api()?);

    match cmd {
        FilmCommands::List => {
            let films = remote(output, "Loading films...", catalog.fetch_all()).await?;
            if !output.is_human() {
                output.json(&json!({ "films": films }));
            } else if films.is_empty() {
                output.info("The catalog is empty");
            } else {
                output.table(&films_table(&films));
            }
        }
        FilmCommands::Show { id } => {
            let film = remote(output, "Loading film...", catalog.fetch_one(&id)).await?;
            print_film(&film, output);
        }
        FilmCommands::Add { fields, image } => {
            let Some(title) = fields.title.clone().filter(|t| !t.trim().is_empty()) else {
                return Err(eyre!("A film needs a --title"));
            };
            let draft = FilmDraft {
                title,
                image,
                ..merge_fields(FilmDraft::default(), &fields)
            };
            let film = remote(output, "Creating film...", catalog.create(&draft)).await?;
            output.success(format!("Created film {} ({})", film.title, film.id));
            print_film(&film, output);
        }
        FilmCommands::Update { id, fields, image } => {
            let current = remote(output, "Loading film...", catalog.fetch_one(&id)).await?;
            let mut draft = merge_fields(current.to_draft(), &fields);
            if image.is_some() {
                draft.image = image;
            }
            if draft == current.to_draft() {
                output.warn("Nothing to change");
                return Ok(());
            }
            let film = remote(output, "Saving film...", catalog.update(&id, &draft)).await?;
            output.success(format!("Updated film {} ({})", film.title, film.id));
            print_film(&film, output);
        }
        FilmCommands::Delete { id } => {
            let deleted = remote(output, "Deleting film...", catalog.delete(&id)).await?;
            output.success(format!("Deleted film {}", deleted));
        }
        FilmCommands::Watch { id, start } => {
            let film = remote(output, "Loading film...", catalog.fetch_one(&id)).await?;
            watch_film(&film, start, env, output)?;
        }
    }

    Ok(())
}

/// Run one catalog call behind a spinner, turning the catalog error into a report
async fn remote<T, F>(output: &Output, message: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let spinner = spinner(output, message);
    let result = call.await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result.map_err(|e| {
        if e.is_not_found() {
            eyre!("Film not found ({})", e)
        } else {
            eyre!(e)
        }
    })
}

fn merge_fields(mut draft: FilmDraft, fields: &ItemFields) -> FilmDraft {
    if let Some(title) = &fields.title {
        draft.title = title.clone();
    }
    if let Some(description) = &fields.description {
        draft.description = Some(description.clone());
    }
    if let Some(rating) = fields.rating_value() {
        draft.rating = Some(rating);
    }
    if let Some(category) = &fields.category {
        draft.category = Some(category.clone());
    }
    draft
}

fn print_film(film: &FilmRecord, output: &Output) {
    if !output.is_human() {
        output.json(&json!({ "film": film }));
        return;
    }
    output.table(&films_table(std::iter::once(film)));
    if let Some(image) = &film.image {
        output.info(format!("Poster: {}", image));
    }
}

fn watch_film(film: &FilmRecord, start: bool, env: &Env, output: &Output) -> Result<()> {
    let item = CatalogItem::from_film(film);
    let key = item.key().map(str::to_string).unwrap_or_else(|| film.id.clone());

    let mut context = env.watch_context();
    let changes = if start {
        context.add_and_start_watching(item)
    } else {
        context.add_to_watchlist(item)
    };
    report_persist_error(&mut context, output)?;

    if changes.watchlist {
        output.success(format!("Added {} to the watchlist", film.title));
    } else {
        output.info(format!("{} is already on the watchlist", film.title));
    }
    if changes.progress {
        output.success(format!("Started tracking {}", key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use reelshelf_models::Rating;
    use tempfile::TempDir;

    fn film() -> FilmRecord {
        FilmRecord {
            id: "7".to_string(),
            title: "Heat".to_string(),
            description: Some("L.A. crime saga".to_string()),
            rating: Some(Rating::Score(8.3)),
            category: Some("Crime".to_string()),
            image: Some("https://img/heat.jpg".to_string()),
        }
    }

    #[test]
    fn test_merge_fields_only_overwrites_given_fields() {
        let fields = ItemFields {
            rating: Some("PG-13".to_string()),
            ..ItemFields::default()
        };
        let draft = merge_fields(film().to_draft(), &fields);
        assert_eq!(draft.title, "Heat");
        assert_eq!(draft.rating, Some(Rating::Label("PG-13".to_string())));
        assert_eq!(draft.category.as_deref(), Some("Crime"));
    }

    #[test]
    fn test_watch_film_uses_poster_as_key() {
        let dir = TempDir::new().unwrap();
        let env = Env::rooted_at(dir.path());
        let output = Output::new(OutputFormat::Json, true);

        watch_film(&film(), true, &env, &output).unwrap();

        let context = env.watch_context();
        assert!(context.is_in_watchlist("https://img/heat.jpg"));
        assert_eq!(context.get_progress("https://img/heat.jpg").unwrap().progress, 0);
    }
}
