use taskflow_assistant::{
    error::AssistantError,
    intent::{quick_actions, QUICK_ACTIONS},
    markup::{self, Line},
    session::{source_from_config, until_shutdown, ConversationSession},
    AssistantConfig, IntentMatcher,
};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn render(line: &Line) -> String {
    line.segments
        .iter()
        .map(|segment| {
            if segment.bold {
                format!("{}{}{}", BOLD, segment.text, RESET)
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

fn print_reply(text: &str) {
    println!();
    for line in markup::parse(text) {
        println!("  {}", render(&line));
    }
    println!();
}

/// Stdin is read on a plain thread: a tokio stdin read can't be cancelled
/// and would hold up runtime shutdown after Ctrl-C.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_quick_actions() {
    let chips: Vec<String> = QUICK_ACTIONS
        .iter()
        .enumerate()
        .map(|(i, action)| format!("/{} {}", i + 1, action.label))
        .collect();
    println!("  {}", chips.join("   "));
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing (quiet by default so it doesn't clutter the chat)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AssistantConfig::from_env()?;
    let source = source_from_config(&config)?;
    let matcher = IntentMatcher::from_config(&config);

    let mut session = ConversationSession::new(source, matcher);
    let shutdown = session.shutdown_handle();

    // Ctrl-C tears the session down; every await below races the token
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    info!(session_id = %session.id(), "TaskFlow assistant started");

    match until_shutdown(&shutdown, session.activate()).await {
        Some(Ok(Some(welcome))) => {
            if welcome.urgent {
                println!("🔔 Something needs your attention");
            }
            print_reply(&welcome.text);
            print_quick_actions();
        }
        Some(Ok(None)) => {}
        Some(Err(AssistantError::SessionClosed)) | None => {
            println!("\nGoodbye! 👋");
            return Ok(());
        }
        Some(Err(e)) => return Err(e.into()),
    }

    let mut lines = spawn_stdin_reader();

    loop {
        print!("you › ");
        std::io::stdout().flush()?;

        let Some(line) = until_shutdown(&shutdown, lines.recv()).await else {
            println!();
            break;
        };
        let Some(input) = line.transpose()? else {
            break;
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/quit" | "/exit") {
            break;
        }
        let utterance = match quick_actions::shortcut(input) {
            Some(action) => {
                println!("  → {}", action.query);
                action.query
            }
            None => input,
        };

        println!("  …typing");

        match until_shutdown(&shutdown, session.send(utterance)).await {
            Some(Ok(reply)) => print_reply(&reply.text),
            Some(Err(AssistantError::EmptyUtterance)) => continue,
            Some(Err(AssistantError::SessionClosed)) | None => break,
            Some(Err(e)) => warn!(error = %e, "Turn failed"),
        }
    }

    session.close();
    println!("Goodbye! 👋");

    Ok(())
}
