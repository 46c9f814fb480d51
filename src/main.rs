mod app;
mod cli;
mod components;
mod config;
mod dispatch;
mod editor;
mod effects;
mod error;
mod event;
mod handler;
mod input;
mod logging;
mod preview_content;
mod session;
mod store;
mod theme;
mod tui;
mod ui;
mod vfs;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::app::{App, Settings};
use crate::config::AppConfig;
use crate::event::{Event, EventHandler};
use crate::preview_content::Highlighter;
use crate::store::{HttpStore, MemoryStore, ObjectStore};
use crate::tui::{install_panic_hook, Tui};

/// A terminal browser for flat key-addressed object buckets.
#[derive(Parser, Debug)]
#[command(name = "bkt", version, about)]
struct Cli {
    /// Folder to open, e.g. `documents/2024` (defaults to the root)
    path: Option<String>,

    /// Base URL of the bucket service
    #[arg(long, global = true)]
    server: Option<String>,

    /// Config file to load before the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Browse an in-memory sample bucket instead of a server
    #[arg(long, global = true)]
    demo: bool,

    /// Disable every mutation, whatever the server allows
    #[arg(long, global = true)]
    read_only: bool,

    /// Do not capture the mouse
    #[arg(long)]
    no_mouse: bool,

    /// Color scheme: dark, light or custom
    #[arg(long)]
    theme: Option<String>,

    /// Log filter, e.g. `debug` or `bucket_browser_tui=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<cli::Command>,
}

impl Cli {
    /// Flags as a config layer that wins over every file.
    fn overrides(&self) -> AppConfig {
        let mut layer = AppConfig::default();
        layer.general.start_path = self.path.clone();
        layer.general.mouse = self.no_mouse.then_some(false);
        layer.server.url = self.server.clone();
        layer.server.demo = self.demo.then_some(true);
        layer.server.read_only = self.read_only.then_some(true);
        layer.theme.scheme = self.theme.clone();
        layer.log.level = self.log_level.clone();
        layer
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let overrides = cli.overrides();
    let loaded = AppConfig::load(cli.config.as_deref(), Some(&overrides));
    let config = loaded.config;

    if let Some(command) = cli.command {
        logging::init_stderr(config.log_level())?;
        log_warnings(&loaded.warnings);
        return if config.demo() {
            run_command(&MemoryStore::demo(), command, &config).await
        } else {
            run_command(&HttpStore::new(config.server_url())?, command, &config).await
        };
    }

    let _guard = match config.log_file() {
        Some(file) => Some(logging::init(config.log_level(), &file)?),
        None => None,
    };
    log_warnings(&loaded.warnings);

    if config.demo() {
        info!("starting with the demo bucket");
        run_tui(MemoryStore::demo(), &config).await
    } else {
        info!(url = config.server_url(), theme = config.theme_scheme(), "starting");
        run_tui(HttpStore::new(config.server_url())?, &config).await
    }
}

fn log_warnings(warnings: &[String]) {
    for warning in warnings {
        warn!("{warning}");
    }
}

async fn run_command<S: ObjectStore>(
    store: &S,
    command: cli::Command,
    config: &AppConfig,
) -> error::Result<()> {
    let remote = match store.config().await {
        Ok(remote) => remote,
        Err(err) => {
            warn!(error = %err, "failed to load remote config, using defaults");
            Default::default()
        }
    };
    let mut options = cli::CommandOptions::from(config);
    options.read_only |= remote.read_only_mode;
    let mut stdout = std::io::stdout().lock();
    cli::run(store, command, &options, &mut stdout).await
}

async fn run_tui<S: ObjectStore>(store: S, config: &AppConfig) -> error::Result<()> {
    install_panic_hook();

    let settings = Settings {
        read_only: config.read_only(),
        confirm_delete: config.confirm_delete(),
        download_dir: config.download_dir(),
        use_icons: config.use_icons(),
        max_chars: config.max_chars(),
        tab_width: config.tab_width(),
    };
    let highlighter = Highlighter::new(
        config.syntax_theme_name(),
        config.highlight_max_bytes(),
        config.tab_width(),
    );
    let mut app = App::new(
        config.start_path(),
        settings,
        theme::resolve_theme(&config.theme),
        highlighter,
    );

    let title = if config.demo() {
        "bkt: demo".to_string()
    } else {
        format!("bkt: {}", config.server_url())
    };
    let mut tui = Tui::new(config.mouse_enabled(), &title)?;
    let result = event_loop(&store, &mut app, &mut tui).await;
    tui.restore()?;
    info!("exiting");
    result
}

/// Draw, then wait for either terminal input or a finished store call.
async fn event_loop<S: ObjectStore>(store: &S, app: &mut App, tui: &mut Tui) -> error::Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));
    let mut pending = FuturesUnordered::new();
    for effect in app.startup() {
        pending.push(effects::run(store, effect));
    }

    loop {
        tui.draw(app)?;

        let follow_up = tokio::select! {
            event = events.next() => {
                let command = match event? {
                    Event::Key(key) => handler::handle_key_event(app, key),
                    Event::Mouse(mouse) => handler::handle_mouse_event(app, mouse),
                    Event::Tick => {
                        app.clear_expired_status();
                        None
                    }
                    Event::Resize => None,
                };
                command.map(|c| app.dispatch(c)).unwrap_or_default()
            }
            Some(completion) = pending.next(), if !pending.is_empty() => app.apply(completion),
        };
        for effect in follow_up {
            pending.push(effects::run(store, effect));
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
