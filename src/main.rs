// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;
mod repl;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use coscribe_config::{ApplyPolicy, Config};
use coscribe_core::{
    Backend, DirectBackend, EditAction, HttpBackend, Session, SessionCommand, SessionEvent,
    SessionHandle, SessionService,
};
use coscribe_document::{DocumentSurface, Presence, SharedDocument, TextRange};
use coscribe_model::{ModelProvider, Role};
use coscribe_search::SearchProvider;
use coscribe_server::AppState;
use repl::ReplLine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        cli::print_completions(*shell);
        return Ok(());
    }

    let mut config = coscribe_config::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
        config.model.name_env = None;
    }

    match cli.command {
        Commands::Completions { .. } => Ok(()),
        Commands::ShowConfig => {
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            Ok(())
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            run_server(config).await
        }
        Commands::Chat { remote, endpoint, file } => {
            let backend = build_backend(&config, remote, endpoint)?;
            run_chat(config, backend, file).await
        }
        Commands::Edit { file, action, start, end, policy, yes, remote, endpoint } => {
            if let Some(policy) = policy {
                config.editor.apply_policy = policy;
            }
            let backend = build_backend(&config, remote, endpoint)?;
            let opts = EditOptions { file, action: EditAction::new(action), start, end, yes };
            run_edit(config, backend, opts).await
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        model = %state.model.model_name(),
        search = %state.search.name(),
        "starting coscribe server"
    );
    coscribe_server::serve(state, &config.server, coscribe_server::shutdown_signal()).await
}

/// Providers called in-process, or a running `coscribe serve` when `remote`.
fn build_backend(
    config: &Config,
    remote: bool,
    endpoint: Option<String>,
) -> anyhow::Result<Arc<dyn Backend>> {
    if remote {
        let url = endpoint.unwrap_or_else(|| config.chat.endpoint.clone());
        info!(%url, "using remote backend");
        return Ok(Arc::new(HttpBackend::new(url)));
    }
    let model: Arc<dyn ModelProvider> = Arc::from(coscribe_model::from_config(&config.model)?);
    let search: Arc<dyn SearchProvider> = Arc::from(coscribe_search::from_config(&config.search)?);
    Ok(Arc::new(DirectBackend::new(model, search)))
}

/// Join a fresh room holding `text` and start a session service on it.
fn open_session(
    config: &Config,
    backend: Arc<dyn Backend>,
    text: String,
) -> (Arc<dyn DocumentSurface>, SessionHandle, tokio::task::JoinHandle<Session>) {
    let doc = SharedDocument::new(config.editor.room.clone(), text);
    let replica: Arc<dyn DocumentSurface> = Arc::new(doc.join(Presence::from_config(&config.editor)));
    let (svc, handle) = SessionService::new(Session::new(config, replica.clone()), backend);
    let task = tokio::spawn(svc.run());
    (replica, handle, task)
}

async fn close_session(
    handle: SessionHandle,
    task: tokio::task::JoinHandle<Session>,
) -> anyhow::Result<()> {
    handle.send(SessionCommand::EndSession).await?;
    task.await.context("session task panicked")?;
    Ok(())
}

/// Wait for the first event `pick` accepts.
async fn next_event<T>(
    events: &mut broadcast::Receiver<SessionEvent>,
    mut pick: impl FnMut(SessionEvent) -> Option<T>,
) -> anyhow::Result<T> {
    loop {
        match events.recv().await {
            Ok(ev) => {
                if let Some(v) = pick(ev) {
                    return Ok(v);
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "session events lagged");
            }
            Err(broadcast::error::RecvError::Closed) => bail!("session ended unexpectedly"),
        }
    }
}

fn save(path: &Path, doc: &dyn DocumentSurface) -> anyhow::Result<()> {
    std::fs::write(path, doc.text()).with_context(|| format!("writing {}", path.display()))
}

// ── chat ──────────────────────────────────────────────────────────────────────

async fn run_chat(
    config: Config,
    backend: Arc<dyn Backend>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = match &file {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        Some(_) => String::new(),
        None => config.editor.initial_content.clone(),
    };
    let (doc, handle, task) = open_session(&config, backend, text);
    let mut events = handle.subscribe();

    println!(
        "coscribe chat in room {:?}. Type /help for commands, {:?} to search the web.",
        config.editor.room,
        config.chat.search_prefix.trim_end()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // Number of visible transcript entries, for `/insert N`.
    let mut visible = 0usize;
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };

        match repl::parse(&line, &config.chat.search_prefix) {
            ReplLine::Empty => {}
            ReplLine::Quit => break,
            ReplLine::Help => println!("{}", repl::HELP),
            ReplLine::Usage(usage) => println!("{usage}"),
            ReplLine::Show => println!("{}", doc.text()),
            ReplLine::Clear => {
                handle.send(SessionCommand::ClearChat).await?;
                next_event(&mut events, |ev| matches!(ev, SessionEvent::ChatCleared).then_some(()))
                    .await?;
                visible = 0;
                println!("(conversation cleared)");
            }
            ReplLine::Insert(index) => {
                handle
                    .send(SessionCommand::SetSelection { range: TextRange::caret(doc.len()) })
                    .await?;
                handle.send(SessionCommand::InsertMessage { index }).await?;
                let outcome = next_event(&mut events, |ev| match ev {
                    SessionEvent::TextInserted { change } => Some(Ok(change)),
                    SessionEvent::Rejected { reason } => Some(Err(reason)),
                    _ => None,
                })
                .await?;
                match outcome {
                    Ok(change) => {
                        println!("(inserted {} characters at {})", change.inserted_len, change.range.start);
                        if let Some(path) = &file {
                            save(path, doc.as_ref())?;
                        }
                    }
                    Err(reason) => println!("(not inserted: {reason})"),
                }
            }
            ReplLine::Message(text) => {
                handle.send(SessionCommand::SendChat { text }).await?;
                let outcome = next_event(&mut events, |ev| match ev {
                    SessionEvent::MessageAppended { message } if message.role == Role::Assistant => {
                        Some(Ok(message.content))
                    }
                    SessionEvent::Rejected { reason } => Some(Err(reason)),
                    _ => None,
                })
                .await?;
                match outcome {
                    Ok(content) => {
                        visible += 2;
                        println!("[{}] {content}", visible - 1);
                    }
                    Err(reason) => println!("({reason})"),
                }
            }
        }
    }

    close_session(handle, task).await
}

// ── edit ──────────────────────────────────────────────────────────────────────

struct EditOptions {
    file: PathBuf,
    action: EditAction,
    start: Option<usize>,
    end: Option<usize>,
    yes: bool,
}

async fn run_edit(config: Config, backend: Arc<dyn Backend>, opts: EditOptions) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&opts.file)
        .with_context(|| format!("reading {}", opts.file.display()))?;
    let len = text.chars().count();
    let range = TextRange::new(opts.start.unwrap_or(0), opts.end.unwrap_or(len))?;
    let policy = config.editor.apply_policy;

    let (doc, handle, task) = open_session(&config, backend, text);
    let mut events = handle.subscribe();

    handle.send(SessionCommand::SetSelection { range }).await?;
    handle.send(SessionCommand::RequestEdit { action: opts.action.clone() }).await?;
    eprintln!("Requesting {:?} for {range} ({policy})...", opts.action.label());

    let ready = next_event(&mut events, |ev| match ev {
        SessionEvent::SuggestionReady { original, suggestion, .. } => Some(Ok((original, suggestion))),
        SessionEvent::SuggestionFailed { message } => Some(Err(message)),
        SessionEvent::Rejected { reason } => Some(Err(reason)),
        _ => None,
    })
    .await?;
    let (original, suggestion) = match ready {
        Ok(pair) => pair,
        Err(reason) => {
            close_session(handle, task).await?;
            bail!("no suggestion: {reason}");
        }
    };

    println!("── Original ──\n{original}\n── Suggestion ──\n{suggestion}\n──────────────");

    if !(opts.yes || confirm("Apply this suggestion? [y/N] ").await?) {
        handle.send(SessionCommand::CancelEdit).await?;
        next_event(&mut events, |ev| matches!(ev, SessionEvent::EditCancelled).then_some(())).await?;
        println!("Discarded.");
        return close_session(handle, task).await;
    }

    handle.send(SessionCommand::ConfirmEdit).await?;
    let applied = next_event(&mut events, |ev| match ev {
        SessionEvent::EditApplied { change } => Some(Ok(change)),
        SessionEvent::Rejected { reason } => Some(Err(reason)),
        _ => None,
    })
    .await?;

    let result = match applied {
        Ok(change) => {
            save(&opts.file, doc.as_ref())?;
            info!(version = change.version, range = %change.range, "edit applied");
            println!("Applied to {}.", opts.file.display());
            Ok(())
        }
        Err(reason) if policy == ApplyPolicy::Revalidate => {
            Err(anyhow::anyhow!("not applied: {reason}; run again to get a fresh suggestion"))
        }
        Err(reason) => Err(anyhow::anyhow!("not applied: {reason}")),
    };
    close_session(handle, task).await?;
    result
}

/// Ask on stdin.  Anything but y/yes declines; so does a non-terminal stdin.
async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !is_stdin_tty() {
        eprintln!("stdin is not a terminal; pass --yes to apply without asking");
        return Ok(false);
    }
    print!("{prompt}");
    io::stdout().flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn is_stdin_tty() -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        unsafe { libc::isatty(io::stdin().as_raw_fd()) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
