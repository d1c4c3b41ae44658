use std::io::Write;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use anyhow::{Result, anyhow, bail};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use portfolio_chat::{
    sanitize_description, Analytics, ChatSession, Config, Deployment, HttpTransport, Portfolio,
    ERROR_MESSAGE, EXAMPLE_QUESTIONS,
};
use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(version, about = "Chat with an AI assistant about Cory's skills, experience and work")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask one question and stream the answer to stdout
    Ask {
        /// Your question
        question: String,
    },
    /// List the example questions
    Examples,
    /// List portfolio items, for one category or all of them
    List {
        /// Category key or route path (ai, dev, design, photo)
        category: Option<String>,
    },
    /// Show the detail record of a portfolio item
    Show {
        /// Full item path, e.g. /dev/vi-1
        path: String,
    },
    /// View or update persisted settings
    Config {
        /// GA4 measurement id
        #[arg(long)]
        measurement_id: Option<String>,
        /// GA4 Measurement Protocol API secret
        #[arg(long)]
        api_secret: Option<String>,
        /// Default log filter, e.g. "info" or "portfolio_chat=debug"
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file must not lock out `portfolio config`, which rewrites it
    let (config, config_error) = Config::load_or_default();

    let command = cli.command.unwrap_or(Commands::Chat);

    // The TUI owns the terminal, so it logs to a file instead of stderr
    let _guard = match command {
        Commands::Chat => Some(logging::init_file(&config)?),
        _ => {
            logging::init_stderr(&config);
            None
        }
    };

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "could not read config; using defaults");
    }

    match command {
        Commands::Chat => run_chat(&config).await?,
        Commands::Ask { question } => ask(&config, &question).await?,
        Commands::Examples => list_examples(),
        Commands::List { category } => {
            let portfolio = Portfolio::builtin()?;
            write_listing(&mut std::io::stdout(), &portfolio, category.as_deref())?
        }
        Commands::Show { path } => show_item(&path)?,
        Commands::Config { measurement_id, api_secret, log_level } => {
            update_config(config, measurement_id, api_secret, log_level)?
        }
    }

    Ok(())
}

fn new_session(config: &Config) -> (ChatSession, Analytics) {
    let deployment = Deployment::detect();
    let transport = HttpTransport::for_deployment(deployment);
    tracing::info!(deployment = deployment.as_str(), endpoint = transport.endpoint(), "chat backend selected");

    let analytics = Analytics::from_config(config);
    let session = ChatSession::new(Arc::new(transport), analytics.clone());
    (session, analytics)
}

async fn run_chat(config: &Config) -> Result<()> {
    let (session, analytics) = new_session(config);
    analytics.track_page_view("/chat");

    let mut terminal = tui::init()?;
    tui::install_panic_hook();

    let mut events = EventHandler::new(session.subscribe());
    let mut app = App::new(session);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let (session, _analytics) = new_session(config);
    let mut updates = session.subscribe();

    if !session.submit(question) {
        bail!("Question is empty");
    }

    let mut stdout = std::io::stdout();
    let mut printed = 0;
    loop {
        let (reply, loading) = {
            let state = updates.borrow_and_update();
            let reply = state.last_message().map(|m| m.content.clone()).unwrap_or_default();
            (reply, state.is_loading)
        };

        if reply == ERROR_MESSAGE {
            if printed > 0 {
                writeln!(stdout)?;
            }
            bail!(ERROR_MESSAGE);
        }

        // Content only ever grows while streaming; print what's new
        if let Some(suffix) = reply.get(printed..) {
            write!(stdout, "{}", suffix)?;
            stdout.flush()?;
            printed = reply.len();
        }

        if !loading {
            break;
        }
        updates.changed().await?;
    }

    writeln!(stdout)?;
    Ok(())
}

fn list_examples() {
    for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        println!("{}. {}", i + 1, question);
    }
}

/// Print one category, or every category when `category` is `None`.
fn write_listing(out: &mut impl Write, portfolio: &Portfolio, category: Option<&str>) -> Result<()> {
    let keys = match category {
        Some(category) => vec![category],
        None => portfolio.category_keys(),
    };

    for (i, key) in keys.into_iter().enumerate() {
        let listing = portfolio
            .category(key)
            .ok_or_else(|| anyhow!("No portfolio content available"))?;

        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", listing.category)?;
        for item in listing.items {
            writeln!(out, "  {:<28} {}", item.url, item.display_title())?;
        }
    }
    Ok(())
}

fn show_item(path: &str) -> Result<()> {
    let portfolio = Portfolio::builtin()?;
    let item = portfolio
        .item(path)
        .ok_or_else(|| anyhow!("No portfolio item at '{}'", path))?;

    println!("{}", item.display_title());
    println!("{}", item.url);
    println!("thumbnail: {}", item.thumb_path);

    let content = &item.sub_content;
    if let Some(desc) = &content.desc {
        println!();
        println!("{}", sanitize_description(desc));
    }
    let videos = content.video_sources();
    if !videos.is_empty() {
        println!();
        for source in videos {
            println!("video: {}", source);
        }
    }
    if !content.images.is_empty() {
        println!();
        for image in &content.images {
            println!("image: {}", image);
        }
    }
    Ok(())
}

fn update_config(
    mut config: Config,
    measurement_id: Option<String>,
    api_secret: Option<String>,
    log_level: Option<String>,
) -> Result<()> {
    let changed = measurement_id.is_some() || api_secret.is_some() || log_level.is_some();

    if let Some(id) = measurement_id {
        config.measurement_id = Some(id);
    }
    if let Some(secret) = api_secret {
        config.api_secret = Some(secret);
    }
    if let Some(level) = log_level {
        config.log_level = Some(level);
    }

    if changed {
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
