//! # lineup console
//!
//! Drives an engine from stdin, one chat line per input line, and prints the
//! replies. Useful for running a session by hand or replaying a chat log.
//!
//! ## Input
//! ```text
//! alice: !join Al             viewer
//! bob+sub: !join Bo           subscriber
//! streamer+mod: !next         moderator
//! !queue                      no prefix: the console operator (moderator)
//! @sub carol                  subscription notice for carol
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=lineup=debug cargo run --bin lineup -- lineup.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lineup::commands::render;
use lineup::{Config, EngineBuilder, EngineHandle, Requester, Subscribe, SubscriberSet};

const OPERATOR: &str = "console";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = Config::load(path.as_deref()).context("loading configuration")?;
    let engine = EngineBuilder::new(cfg)
        .build()
        .context("opening the play ledger")?;

    let token = CancellationToken::new();
    let subscribers = SubscriberSet::new(build_subscribers(), engine.bus().clone());
    tokio::spawn(subscribers.listen(token.clone()));
    let handle = lineup::spawn(engine, token.clone());
    info!("reading chat lines from stdin");

    let shutdown = wait_for_shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            res = &mut shutdown => {
                if let Err(e) = res {
                    warn!(error = %e, "signal handler failed");
                }
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                if let Some(text) = handle_line(&handle, &line).await? {
                    println!("{text}");
                }
            }
        }
    }

    token.cancel();
    info!("console closed");
    Ok(())
}

fn build_subscribers() -> Vec<Arc<dyn Subscribe>> {
    #[cfg(feature = "logging")]
    {
        vec![Arc::new(lineup::LogWriter::new())]
    }
    #[cfg(not(feature = "logging"))]
    {
        Vec::new()
    }
}

async fn handle_line(handle: &EngineHandle, line: &str) -> anyhow::Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(who) = line.strip_prefix("@sub") {
        let who = who.trim().to_string();
        let requester = Requester::subscriber(who.clone());
        let outcome = handle.submit(move |e| e.new_subscriber(&who)).await?;
        return Ok(match outcome {
            Ok(outcome) => render::outcome(&requester, &outcome).text,
            Err(err) => {
                warn!(label = err.as_label(), "{}", err.as_message());
                None
            }
        });
    }

    let (requester, message) = split_sender(line);
    Ok(handle.command(requester, message).await?.text)
}

/// `handle[+mod][+sub]: message`; lines without a sender come from the operator.
fn split_sender(line: &str) -> (Requester, String) {
    let Some((sender, message)) = line.split_once(':').filter(|(s, _)| !s.contains(' ')) else {
        return (Requester::moderator(OPERATOR), line.to_string());
    };
    let mut parts = sender.split('+');
    let handle = parts.next().unwrap_or(OPERATOR).trim();
    let mut requester = Requester::viewer(handle);
    for flag in parts {
        match flag.trim() {
            "mod" => requester.is_moderator = true,
            "sub" => requester.is_subscriber = true,
            other => warn!(flag = other, "unknown sender flag"),
        }
    }
    (requester, message.trim().to_string())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
