use super::Env;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use reelshelf_config::Config;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, env: &Env, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(env, output),
        ConfigCommands::Init { force } => init_config(force, env, output),
        ConfigCommands::Path => show_paths(env, output),
    }
}

fn show_config(env: &Env, output: &Output) -> Result<()> {
    let config = &env.config;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !env.config_file.exists() {
                output.warn(format!(
                    "No configuration file at {}; showing defaults",
                    env.config_file.display()
                ));
                output.info("Run 'reelshelf config init' to write one.");
            }

            println!("\n{}", "Configuration".bright_cyan().bold());

            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL);
            table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
            table.set_header(vec![
                Cell::new("Setting").add_attribute(Attribute::Bold),
                Cell::new("Value").add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config file"), Cell::new(env.config_file.display())]);
            table.add_row(vec![
                Cell::new("Catalog URL").fg(Color::Cyan),
                Cell::new(&config.api.base_url),
            ]);
            table.add_row(vec![
                Cell::new("Request timeout").fg(Color::Cyan),
                Cell::new(format!("{}s", config.api.timeout_seconds)),
            ]);
            table.add_row(vec![
                Cell::new("Storage directory").fg(Color::Cyan),
                Cell::new(env.storage_dir().display()),
            ]);
            table.add_row(vec![Cell::new("Log level"), Cell::new(&config.logging.level)]);
            table.add_row(vec![
                Cell::new("JSON logs"),
                Cell::new(if config.logging.json { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            table.add_row(vec![
                Cell::new("Log file"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "stderr".to_string()),
                ),
            ]);
            output.table(&table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "configFile": env.config_file.display().to_string(),
                "exists": env.config_file.exists(),
                "api": {
                    "baseUrl": config.api.base_url,
                    "timeoutSeconds": config.api.timeout_seconds,
                },
                "storageDir": env.storage_dir().display().to_string(),
                "logging": {
                    "level": config.logging.level,
                    "json": config.logging.json,
                    "file": config.logging.file.as_ref().map(|p| p.display().to_string()),
                },
            }));
        }
    }

    Ok(())
}

fn init_config(force: bool, env: &Env, output: &Output) -> Result<()> {
    if env.config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {}. Use --force to overwrite it.",
            env.config_file.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(&env.config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", env.config_file.display(), e))?;
    env.paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create data directories: {}", e))?;

    output.success(format!("Wrote default configuration to {}", env.config_file.display()));
    Ok(())
}

fn show_paths(env: &Env, output: &Output) -> Result<()> {
    let storage_dir = env.storage_dir();
    if output.is_human() {
        output.info(format!("Config file:  {}", env.config_file.display()));
        output.info(format!("Storage dir:  {}", storage_dir.display()));
        output.info(format!("Log dir:      {}", env.paths.log_dir().display()));
    } else {
        output.json(&json!({
            "configFile": env.config_file.display().to_string(),
            "storageDir": storage_dir.display().to_string(),
            "logDir": env.paths.log_dir().display().to_string(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let env = Env::rooted_at(dir.path());
        let output = Output::new(OutputFormat::Json, true);

        init_config(false, &env, &output).unwrap();
        assert!(env.config_file.exists());
        assert!(env.paths.storage_dir().is_dir());

        std::fs::write(&env.config_file, "[api]\nbase_url = \"http://localhost:3000\"\n").unwrap();
        init_config(false, &env, &output).unwrap();
        let kept = Config::load_from_file(&env.config_file).unwrap();
        assert_eq!(kept.api.base_url, "http://localhost:3000");

        init_config(true, &env, &output).unwrap();
        let reset = Config::load_from_file(&env.config_file).unwrap();
        assert_eq!(reset.api.base_url, reelshelf_config::DEFAULT_API_BASE_URL);
    }
}
