//! chatwidget CLI: terminal client for the crime-complaint analytics assistant

use chatwidget_engine::{
    navigation_target, ChatController, ChatView, Config, ControllerEvent, HttpTransport,
    LogEntry, MemoryView, Selector, Turn,
};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Chat client for the complaint analytics assistant
#[derive(Parser)]
#[command(name = "chatwidget")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .chatwidget/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one message and print the resulting turns
    Send {
        /// Message text
        message: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the page a selector would navigate to
    Route {
        /// Selector: detalle or prediccion
        selector: Selector,

        /// Selected value
        value: String,
    },

    /// Initialize .chatwidget/ directory and config
    Init,
}

const CHATWIDGET_DIR: &str = ".chatwidget";

fn main() {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| Path::new(CHATWIDGET_DIR).join("config.json"));

    let result = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&config_path),
        Some(Commands::Send { message, json }) => cmd_send(&config_path, &message, json),
        Some(Commands::Route { selector, value }) => cmd_route(&config_path, selector, &value),
        Some(Commands::Init) => cmd_init(&config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, leaving stdout for command output.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .init();
}

/// Log to a file so the alternate screen is not overwritten.
fn init_file_logging(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(dir.join("chatwidget.log"))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(env_filter())
        .init();
    Ok(())
}

fn cmd_tui(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dir = Path::new(CHATWIDGET_DIR);
    init_file_logging(dir)?;
    let config = load_config(config_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(chatwidget_tui::run_tui(&config, &dir.join("exports")))
}

/// Load the config file (or defaults) and log where it came from.
fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_path)?;
    debug!(
        path = %config_path.display(),
        found = config_path.exists(),
        base_url = %config.base_url,
        "loaded config"
    );
    Ok(config)
}

fn cmd_send(
    config_path: &Path,
    message: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_stderr_logging();
    let config = load_config(config_path)?;
    let transport = HttpTransport::from_config(&config);

    let rt = tokio::runtime::Runtime::new()?;
    let view = rt.block_on(async {
        let (mut controller, mut events) =
            ChatController::new(MemoryView::new(), transport, &config);
        controller.view_mut().set_input_value(message);
        if controller.send_message().is_some() {
            while let Some(event) = events.recv().await {
                let settled = matches!(event, ControllerEvent::Settled { .. });
                controller.handle_event(event);
                if settled {
                    info!(turns = controller.view().entries.len(), "message settled");
                    break;
                }
            }
        } else {
            info!("empty message, nothing sent");
        }
        controller.view().clone()
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&view.entries)?);
    } else {
        for entry in &view.entries {
            println!("{}", format_entry(entry));
        }
    }
    Ok(())
}

fn format_entry(entry: &LogEntry) -> String {
    let speaker = match entry {
        LogEntry::Turn(Turn::User(_)) => "Tú",
        LogEntry::Turn(Turn::Error(_)) => "Error",
        LogEntry::Turn(_) => "Asistente",
        LogEntry::QuickAction(_) => "Atajo",
    };
    format!("{speaker}: {}", entry.text())
}

fn cmd_route(
    config_path: &Path,
    selector: Selector,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    init_stderr_logging();
    let config = load_config(config_path)?;
    if let Some(path) = navigation_target(selector, value) {
        println!("{}", config.url_for(&path));
    }
    Ok(())
}

fn cmd_init(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    init_stderr_logging();
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Config::default().save(config_path)?;
    info!(path = %config_path.display(), "wrote default config");
    println!("Created {}", config_path.display());
    Ok(())
}
