use super::{report_persist_error, Env};
use crate::output::{progress_bar_text, progress_table, Output};
use crate::ProgressCommands;
use color_eyre::Result;
use reelshelf_core::WatchOps;
use reelshelf_models::{clamp_progress, ProgressRecord};
use serde_json::json;

pub async fn run_progress(cmd: ProgressCommands, env: &Env, output: &Output) -> Result<()> {
    let mut context = env.watch_context();

    match cmd {
        ProgressCommands::List { in_progress } => {
            let records: Vec<&ProgressRecord> = if in_progress {
                context.watch_progress().in_progress()
            } else {
                context.watch_progress().iter().map(|(_, record)| record).collect()
            };

            if !output.is_human() {
                output.json(&json!({ "progress": records }));
            } else if records.is_empty() {
                output.info(if in_progress {
                    "Nothing in progress"
                } else {
                    "No titles are being tracked"
                });
            } else {
                output.table(&progress_table(records));
            }
        }
        ProgressCommands::Start { id, kind } => {
            context.start_watching(&id, &kind);
            report_persist_error(&mut context, output)?;
            output.success(format!("Started tracking {} at 0%", id));
        }
        ProgressCommands::Set { id, percent } => {
            let changes = context.update_progress(&id, percent);
            report_persist_error(&mut context, output)?;
            if changes.progress {
                output.success(format!("{} is now at {}%", id, clamp_progress(percent)));
            } else {
                output.warn(format!(
                    "{} is not being tracked; run 'reelshelf progress start {}' first",
                    id, id
                ));
            }
        }
        ProgressCommands::Show { id } => match context.get_progress(&id) {
            Some(record) => {
                if output.is_human() {
                    output.info(format!("{}  {}", progress_bar_text(record.progress), record.id));
                    output.info(format!(
                        "type: {}, started {}, last watched {}",
                        record.kind,
                        record.started_at.to_rfc3339(),
                        record.last_watched_at.to_rfc3339()
                    ));
                } else {
                    output.json(&json!({ "progress": record }));
                }
            }
            None => output.warn(format!("No progress recorded for {}", id)),
        },
        ProgressCommands::Remove { id } => {
            let changes = context.remove_progress(&id);
            report_persist_error(&mut context, output)?;
            if changes.progress {
                output.success(format!("Stopped tracking {}", id));
            } else {
                output.warn(format!("No progress recorded for {}", id));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_start_then_set_clamps_and_persists() {
        let dir = TempDir::new().unwrap();
        let env = Env::rooted_at(dir.path());
        let output = Output::new(OutputFormat::Json, true);

        run_progress(
            ProgressCommands::Set { id: "x".to_string(), percent: 30.0 },
            &env,
            &output,
        )
        .await
        .unwrap();
        assert!(!env.watch_context().has_progress("x"));

        run_progress(
            ProgressCommands::Start { id: "x".to_string(), kind: "series".to_string() },
            &env,
            &output,
        )
        .await
        .unwrap();
        run_progress(
            ProgressCommands::Set { id: "x".to_string(), percent: 140.0 },
            &env,
            &output,
        )
        .await
        .unwrap();

        let context = env.watch_context();
        let record = context.get_progress("x").unwrap();
        assert_eq!(record.progress, 100);
        assert_eq!(record.kind, "series");
    }
}
