use clap::{Parser, Subcommand};
use colored::*;
use anyhow::Result;

mod app;
mod config;
mod extract;
mod handler;
mod langflow;
mod logging;
mod tui;
mod ui;

use app::App;
use config::Settings;
use langflow::LangflowClient;

#[derive(Parser)]
#[command(name = "flowchat")]
#[command(about = "Chat with a Langflow flow from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session (default)
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Your message
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Missing settings (the token above all) abort before any UI
    let settings = match Settings::resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "Configuration error".red(), e);
            std::process::exit(1);
        }
    };
    let client = LangflowClient::new(&settings);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(client).await?,
        Commands::Ask { message } => ask_once(&client, &message).await,
    }

    Ok(())
}

async fn run_chat(client: LangflowClient) -> Result<()> {
    // The TUI owns the terminal; logs go to a file. Chat still works if
    // the log file cannot be opened.
    if let Ok(path) = logging::init() {
        tracing::info!(log = %path.display(), "flowchat session starting");
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }
    }

    tui::restore()?;
    Ok(())
}

async fn ask_once(client: &LangflowClient, message: &str) {
    if message.trim().is_empty() {
        println!("{}", "Please enter a message first.".yellow());
        std::process::exit(1);
    }

    match client.run_flow(message).await {
        Ok(reply) => {
            println!("{}", "Bot:".bold().green());
            println!("{}", reply);
        }
        Err(e) => {
            println!("{}: {}", "Error querying flow".red(), e);
            println!(
                "Check your {} and network connection.",
                "APPLICATION_TOKEN".bold()
            );
            std::process::exit(1);
        }
    }
}
