use clap::ValueEnum;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use reelshelf_core::WatchProgress;
use reelshelf_models::{FilmRecord, ProgressRecord, WatchStatus, WatchlistEntry};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", "✓".green().to_string(), msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", "⚠".yellow().to_string(), msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    /// Structured payload for the JSON formats; ignored in human mode
    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet || self.format == OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    pub fn table(&self, table: &Table) {
        if self.quiet || self.format != OutputFormat::Human {
            return;
        }
        println!("{}", table);
    }

    fn message(&self, kind: &str, symbol: String, msg: &str) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", symbol, msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default())
            }
            OutputFormat::Human => println!("{}", data),
        }
    }
}

fn styled_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        header
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn status_cell(status: WatchStatus) -> Cell {
    let color = match status {
        WatchStatus::PlanToWatch => Color::Cyan,
        WatchStatus::Watching => Color::Yellow,
        WatchStatus::Finished => Color::Green,
    };
    Cell::new(status.as_str()).fg(color)
}

pub fn progress_bar_text(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) / 10;
    format!("{}{} {:>3}%", "█".repeat(filled), "░".repeat(10 - filled), percent)
}

pub fn watchlist_table<'a>(
    entries: impl IntoIterator<Item = &'a WatchlistEntry>,
    progress: &WatchProgress,
) -> Table {
    let mut table = styled_table(vec!["#", "Title", "Status", "Progress", "Note", "Src"]);
    for (index, entry) in entries.into_iter().enumerate() {
        let progress_text = progress
            .get(&entry.src)
            .map(|record| progress_bar_text(record.progress))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&entry.title),
            status_cell(entry.status),
            Cell::new(progress_text),
            Cell::new(if entry.note.is_empty() { "-" } else { entry.note.as_str() }),
            Cell::new(&entry.src),
        ]);
    }
    table
}

pub fn progress_table<'a>(records: impl IntoIterator<Item = &'a ProgressRecord>) -> Table {
    let mut table = styled_table(vec!["Id", "Type", "Progress", "Started", "Last watched"]);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(&record.kind),
            Cell::new(progress_bar_text(record.progress)),
            Cell::new(record.started_at.format("%Y-%m-%d %H:%M")),
            Cell::new(record.last_watched_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn films_table<'a>(films: impl IntoIterator<Item = &'a FilmRecord>) -> Table {
    let mut table = styled_table(vec!["Id", "Title", "Category", "Rating", "Description"]);
    for film in films {
        table.add_row(vec![
            Cell::new(&film.id),
            Cell::new(&film.title),
            Cell::new(film.category.as_deref().unwrap_or("-")),
            Cell::new(film.rating.as_ref().map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(film.description.as_deref().unwrap_or("-")),
        ]);
    }
    table
}
