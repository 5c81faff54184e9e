//! Terminal chat front end for the Folio API.
//!
//! Free text streams a chat turn, printing deltas as they arrive. Commands:
//! `/card <category>`, `/clear`, `/quit`. Ctrl-C during a turn aborts it
//! without failing the session.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_client::render::{render_card, render_project_list};
use folio_client::session::{ChatSession, SendOutcome};
use folio_client::transport::{ChatTransport, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with streamed replies.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", env!("CARGO_CRATE_NAME")))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_url =
        std::env::var("FOLIO_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let transport = Arc::new(HttpTransport::new(base_url.clone()));

    match transport.fetch_personal().await {
        Ok(personal) => {
            if let Some(name) = personal["personalInfo"]["name"].as_str() {
                println!("Chatting with {}'s portfolio ({base_url})", name.bold());
            }
        }
        Err(e) => {
            eprintln!("{} could not reach {base_url}: {e}", "warning:".yellow());
        }
    }
    println!("Commands: /card <me|projects|skills|contact|resume|fun>, /clear, /quit");

    let mut session = ChatSession::new(transport.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "you>".green());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // stdin closed
        };
        let line = line.trim().to_string();

        match line.as_str() {
            "" => continue,
            "/quit" => break,
            "/clear" => {
                session.clear_messages();
                println!("(cleared)");
                continue;
            }
            command if command.starts_with("/card") => {
                let category = command.strip_prefix("/card").unwrap().trim();
                if category.is_empty() {
                    println!("usage: /card <me|projects|skills|contact|resume|fun>");
                    continue;
                }
                match transport.fetch_card(category).await {
                    Ok(card) => {
                        println!("{}", render_card(&card.structured_data));
                        if let Some(projects) = card.projects.as_deref() {
                            if projects.len() > 1 {
                                println!("{}", render_project_list(&projects[1..]));
                            }
                        }
                        println!("{}", card.message);
                        session.add_card_message(card);
                    }
                    Err(e) => println!("{} {e}", "error:".red()),
                }
                continue;
            }
            _ => {}
        }

        run_turn(&mut session, &line).await;
    }

    Ok(())
}

/// Streams one chat turn, printing deltas in place. Ctrl-C aborts the turn
/// via the session's abort handle and leaves applied content as-is.
async fn run_turn(session: &mut ChatSession, line: &str) {
    let handle = session.abort_handle();
    print!("{} ", "assistant>".blue());
    let _ = std::io::stdout().flush();

    // Scoped so the send future releases its borrow before the session is
    // read below.
    let result = {
        let send = session.send_message(line, |delta| {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        });
        tokio::pin!(send);

        loop {
            tokio::select! {
                result = &mut send => break result,
                _ = tokio::signal::ctrl_c() => {
                    handle.abort();
                }
            }
        }
    };
    println!();

    match result {
        Ok(SendOutcome::Completed) => {
            if let Some(message) = session.messages().last() {
                if let Some(card) = &message.structured_data {
                    println!("{}", render_card(card));
                }
            }
        }
        Ok(SendOutcome::Aborted) => println!("(stopped)"),
        Ok(SendOutcome::Ignored) => {}
        Err(e) => println!("{} {e}", "error:".red()),
    }
}
