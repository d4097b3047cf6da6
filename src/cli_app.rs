//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{ColoredString, Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use mero_tab::core::config::Config;
use mero_tab::core::errors::MeroError;
use mero_tab::display::appearance::{Appearance, parse_hex};
use mero_tab::display::clock::ClockFace;
use mero_tab::drag::coordinator::DragKind;
use mero_tab::page::{DropOutcome, NewTabPage, PageView};
use mero_tab::settings::record::{SaveMode, SettingKey};
use mero_tab::settings::theme::Theme;

/// Mero Tab: new-tab page settings, bookmarks and folder ordering.
#[derive(Debug, Parser)]
#[command(
    name = "mero",
    author,
    version,
    about = "Mero Tab - new-tab page settings and bookmarks",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Use this local settings file (disables the synchronized store).
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Bookmark source: forest JSON or Chromium `Bookmarks` file.
    #[arg(long, global = true, value_name = "PATH")]
    bookmarks: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Render the page once: clock, greeting, date and bookmark folders.
    Show,
    /// Run the page event loop, printing clock and settings changes.
    Watch(WatchArgs),
    /// Read and change settings.
    Settings(SettingsArgs),
    /// List themes, or apply one.
    Theme(ThemeArgs),
    /// Show or set the folder order.
    Order(OrderArgs),
    /// Reorder a folder or a bookmark by dropping it on another.
    Move(MoveArgs),
    /// Show configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct WatchArgs {
    /// Stop after this many ticks.
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,
}

#[derive(Debug, Clone, Args)]
struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum SettingsCommand {
    /// Print one setting, or all of them.
    Get {
        /// Setting name (camelCase, snake_case or kebab-case).
        key: Option<String>,
    },
    /// Change one setting.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: String,
    },
    /// Restore every setting to its default.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Show where settings are stored.
    Path,
}

#[derive(Debug, Clone, Args)]
struct ThemeArgs {
    /// Theme to apply.
    name: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct OrderArgs {
    #[command(subcommand)]
    command: OrderCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum OrderCommand {
    /// Print folders in display order.
    Show,
    /// Save a new folder order (titles, first to last).
    Set {
        #[arg(required = true)]
        titles: Vec<String>,
    },
}

#[derive(Debug, Clone, Args)]
struct MoveArgs {
    #[command(subcommand)]
    command: MoveCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum MoveCommand {
    /// Drop a folder (id or title) on another folder.
    Folder { dragged: String, target: String },
    /// Drop a bookmark (id) on another bookmark.
    Item { dragged: String, target: String },
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Print the config file path.
    Path,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl From<MeroError> for CliError {
    fn from(value: MeroError) -> Self {
        match value {
            MeroError::UnknownSetting { .. }
            | MeroError::InvalidSetting { .. }
            | MeroError::MissingConfig { .. } => Self::User(value.to_string()),
            other => Self::Runtime(other.to_string()),
        }
    }
}

impl Cli {
    /// Install the stderr log subscriber.
    ///
    /// `-v`/`-q` win; otherwise `MERO_LOG`, then `RUST_LOG`, then `warn`.
    pub fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_env("MERO_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Show => run_show(cli),
        Command::Watch(args) => run_watch(cli, args),
        Command::Settings(args) => run_settings(cli, args),
        Command::Theme(args) => run_theme(cli, args),
        Command::Order(args) => run_order(cli, args),
        Command::Move(args) => run_move(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.settings {
        config.storage.settings_file.clone_from(path);
        config.storage.sync_file = None;
    }
    if let Some(path) = &cli.bookmarks {
        config.bookmarks.source = Some(path.clone());
    }
    Ok(config)
}

fn open_page(cli: &Cli) -> Result<(Config, NewTabPage), CliError> {
    let config = load_config(cli)?;
    let mut page = NewTabPage::from_config(&config);
    page.start();
    Ok((config, page))
}

// ──────────────────── show / watch ────────────────────

fn run_show(cli: &Cli) -> Result<(), CliError> {
    let (_, page) = open_page(cli)?;
    let view = page.view();
    match output_mode(cli) {
        OutputMode::Human => print_view_human(&view),
        OutputMode::Json => {
            let payload = json!({
                "command": "show",
                "view": serde_json::to_value(&view)?,
                "css": css_map(&view.appearance),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn print_view_human(view: &PageView) {
    let fg = &view.appearance.foreground;
    let accent = &view.appearance.accent;
    println!("{}", paint(&view.title, accent).bold());
    println!();
    println!("  {}", paint(&view.clock.time_text(), fg).bold());
    println!("  {}", paint(&view.clock.greeting, fg));
    println!("  {}", view.clock.date.dimmed());
    println!();
    if view.folders.is_empty() {
        println!("  (no bookmarks)");
    }
    for folder in &view.folders {
        println!("  {}", paint(&folder.title, accent).bold());
        for item in &folder.items {
            println!("    {}  {}", paint(&item.title, fg), item.url.dimmed());
        }
    }
    println!();
    println!("  {} {}", "source:".dimmed(), view.source);
}

fn run_watch(cli: &Cli, args: &WatchArgs) -> Result<(), CliError> {
    let (config, mut page) = open_page(cli)?;
    let mode = output_mode(cli);
    let interval = config.runtime.tick_interval();
    let mut last_line = String::new();
    let mut ticks = 0_u64;

    loop {
        let report = page.tick();
        let face = ClockFace::now(page.settings());
        match mode {
            OutputMode::Human => {
                let line = format!("{}  {}", face.time_text(), face.greeting);
                if line != last_line || report.reloaded {
                    println!("{}", paint(&line, &page.appearance().foreground));
                    last_line = line;
                }
                if report.reloaded {
                    println!("  {}", "settings changed externally".dimmed());
                }
            }
            OutputMode::Json => {
                let payload = json!({
                    "event": "tick",
                    "time": face.time_text(),
                    "changed_digits": report.changed_digits,
                    "saved": report.saved,
                    "reloaded": report.reloaded,
                });
                write_json_line(&payload)?;
            }
        }

        ticks += 1;
        if args.ticks.is_some_and(|limit| ticks >= limit) {
            break;
        }
        std::thread::sleep(interval.max(Duration::from_millis(50)));
    }

    page.shutdown();
    Ok(())
}

// ──────────────────── settings ────────────────────

fn run_settings(cli: &Cli, args: &SettingsArgs) -> Result<(), CliError> {
    match &args.command {
        SettingsCommand::Get { key } => {
            let (_, page) = open_page(cli)?;
            let record = page.settings();
            match (key, output_mode(cli)) {
                (Some(key), OutputMode::Human) => {
                    let key: SettingKey = key.parse()?;
                    println!("{}", record.get_display(key));
                }
                (Some(key), OutputMode::Json) => {
                    let key: SettingKey = key.parse()?;
                    write_json_line(&json!({
                        "command": "settings get",
                        "key": key.as_str(),
                        "value": record.get(key),
                    }))?;
                }
                (None, OutputMode::Human) => {
                    let width = SettingKey::ALL
                        .iter()
                        .map(|k| k.as_str().len())
                        .max()
                        .unwrap_or(0);
                    for (key, _) in record.entries() {
                        let name = format!("{:width$}", key.as_str());
                        println!("{}  {}", name.bold(), record.get_display(key));
                    }
                }
                (None, OutputMode::Json) => {
                    write_json_line(&json!({
                        "command": "settings get",
                        "settings": record.to_stored()?,
                    }))?;
                }
            }
            Ok(())
        }
        SettingsCommand::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let (_, mut page) = open_page(cli)?;
            let mode = page.change_setting(key, value)?;
            page.shutdown();
            let current = page.settings().get(key);
            match output_mode(cli) {
                OutputMode::Human => {
                    let how = match mode {
                        SaveMode::Immediate => "saved",
                        SaveMode::Debounced => "saved (debounced write flushed)",
                    };
                    println!("{key} = {}  {}", page.settings().get_display(key), how.dimmed());
                    if matches!(
                        key,
                        SettingKey::BackgroundColor | SettingKey::ForegroundColor | SettingKey::AccentColor
                    ) {
                        println!("theme = {}", page.settings().theme);
                    }
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "settings set",
                    "key": key.as_str(),
                    "value": current,
                    "theme": page.settings().theme,
                }))?,
            }
            Ok(())
        }
        SettingsCommand::Reset { yes } => {
            if !yes && !confirm("Reset all settings to their defaults?")? {
                return Err(CliError::User("reset cancelled".to_string()));
            }
            let (_, mut page) = open_page(cli)?;
            page.reset();
            match output_mode(cli) {
                OutputMode::Human => println!("Settings restored to defaults."),
                OutputMode::Json => write_json_line(&json!({
                    "command": "settings reset",
                    "settings": page.settings().to_stored()?,
                }))?,
            }
            Ok(())
        }
        SettingsCommand::Path => {
            let config = load_config(cli)?;
            let store = mero_tab::settings::store::SettingsStore::open(&config.storage);
            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", store.describe_backend());
                    println!("  kind: {}", store.backend_kind());
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "settings path",
                    "backend": store.describe_backend(),
                    "kind": store.backend_kind().to_string(),
                }))?,
            }
            Ok(())
        }
    }
}

/// Ask on the terminal. Without a terminal there is nobody to ask.
fn confirm(question: &str) -> Result<bool, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::User(
            "refusing to reset without confirmation; pass --yes".to_string(),
        ));
    }
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// ──────────────────── theme / order / move ────────────────────

fn run_theme(cli: &Cli, args: &ThemeArgs) -> Result<(), CliError> {
    let (_, mut page) = open_page(cli)?;
    if let Some(name) = &args.name {
        let theme: Theme = name.parse()?;
        page.select_theme(theme);
    }
    let current = page.settings().theme;

    match output_mode(cli) {
        OutputMode::Human => {
            for theme in Theme::ALL {
                let marker = if theme == current { "*" } else { " " };
                let swatch = theme.preset().map_or_else(String::new, |p| {
                    format!(
                        "{} {} {}",
                        paint("██", p.background),
                        paint("██", p.foreground),
                        paint("██", p.accent)
                    )
                });
                println!("{marker} {:<11} {swatch}", theme.as_str());
            }
        }
        OutputMode::Json => write_json_line(&json!({
            "command": "theme",
            "theme": current,
            "colors": {
                "background": page.settings().background_color,
                "foreground": page.settings().foreground_color,
                "accent": page.settings().accent_color,
            },
        }))?,
    }
    Ok(())
}

fn run_order(cli: &Cli, args: &OrderArgs) -> Result<(), CliError> {
    let (_, mut page) = open_page(cli)?;
    if let OrderCommand::Set { titles } = &args.command {
        page.change_setting(SettingKey::FolderOrder, &titles.join("\n"))?;
    }
    print_folder_order(cli, &page)
}

fn print_folder_order(cli: &Cli, page: &NewTabPage) -> Result<(), CliError> {
    match output_mode(cli) {
        OutputMode::Human => {
            for (i, folder) in page.folders().iter().enumerate() {
                let tag = if folder.synthetic { " (loose links)" } else { "" };
                println!(
                    "{:>2}. {}{}  {}",
                    i + 1,
                    folder.title.bold(),
                    tag,
                    format!("[{}]", folder.id).dimmed()
                );
            }
        }
        OutputMode::Json => {
            let folders: Vec<Value> = page
                .folders()
                .iter()
                .map(|f| json!({"id": f.id, "title": f.title, "items": f.items.len()}))
                .collect();
            write_json_line(&json!({
                "command": "order",
                "folder_order": page.settings().folder_order,
                "folders": folders,
            }))?;
        }
    }
    Ok(())
}

fn run_move(cli: &Cli, args: &MoveArgs) -> Result<(), CliError> {
    let (_, mut page) = open_page(cli)?;
    let outcome = match &args.command {
        MoveCommand::Folder { dragged, target } => {
            let dragged = folder_id(&page, dragged)?;
            let target = folder_id(&page, target)?;
            page.drag_and_drop(&dragged, &target, DragKind::Folder)
        }
        MoveCommand::Item { dragged, target } => {
            page.drag_and_drop(dragged, target, DragKind::Item)
        }
    };
    page.shutdown();
    let Some(outcome) = outcome else {
        return Err(CliError::User("nothing moved: unknown or identical elements".to_string()));
    };

    match output_mode(cli) {
        OutputMode::Human => match &outcome {
            DropOutcome::FoldersReordered { folder_order } => {
                println!("Folder order saved:");
                for title in folder_order.lines() {
                    println!("  {title}");
                }
            }
            DropOutcome::ItemMoved { item, persisted } => {
                println!(
                    "Moved {} into {} at position {}.",
                    item.item_id,
                    item.to_folder,
                    item.index + 1
                );
                if !persisted {
                    println!("  {}", "bookmark source did not accept the move".yellow());
                }
            }
        },
        OutputMode::Json => write_json_line(&json!({
            "command": "move",
            "outcome": serde_json::to_value(&outcome)?,
        }))?,
    }
    Ok(())
}

fn folder_id(page: &NewTabPage, id_or_title: &str) -> Result<String, CliError> {
    page.board()
        .resolve_folder(id_or_title)
        .map(|f| f.id.clone())
        .ok_or_else(|| CliError::User(format!("no folder named {id_or_title:?}")))
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
    }
}

// ──────────────────── output helpers ────────────────────

/// Text in a settings color, plain when the color is not hex.
fn paint(text: &str, color: &str) -> ColoredString {
    match parse_hex(color) {
        Some(rgb) => text.truecolor(rgb.r, rgb.g, rgb.b),
        None => text.normal(),
    }
}

fn css_map(appearance: &Appearance) -> Value {
    appearance
        .css_variables()
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("MERO_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
