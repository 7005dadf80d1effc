// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use coscribe_config::ApplyPolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "coscribe",
    about = "Collaborative text editing with an AI chat panel and inline edit suggestions",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Model name forwarded to the completion provider, e.g. "gpt-4o"
    #[arg(long, short = 'M', env = "COSCRIBE_MODEL", global = true)]
    pub model: Option<String>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the chat-completion and web-search HTTP endpoints
    Serve {
        /// Address to listen on (overrides `server.bind`)
        #[arg(long, short = 'b')]
        bind: Option<String>,
    },

    /// Interactive chat panel attached to a document.
    ///
    /// Lines starting with the search prefix ("/agent " by default) are
    /// sent to web search; everything else goes to the chat model.
    /// `/insert N` appends transcript entry N to the document, `/clear`
    /// resets the transcript, `/show` prints the document and `/quit` exits.
    Chat {
        /// Talk to a running `coscribe serve` instead of the providers directly
        #[arg(long)]
        remote: bool,
        /// Base URL of the server used with --remote (overrides `chat.endpoint`)
        #[arg(long)]
        endpoint: Option<String>,
        /// Document to load; inserted replies are written back to it
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Ask for an AI edit of a range of a file and apply it on confirmation
    Edit {
        /// File to edit
        file: PathBuf,
        /// Edit action label, e.g. "Shorten" or "Convert to table"
        #[arg(long, short = 'a', default_value = "Fix grammar")]
        action: String,
        /// First character of the selection (default: start of file)
        #[arg(long)]
        start: Option<usize>,
        /// One past the last character of the selection (default: end of file)
        #[arg(long)]
        end: Option<usize>,
        /// How the suggestion is placed (overrides `editor.apply_policy`)
        #[arg(long, value_enum)]
        policy: Option<ApplyPolicy>,
        /// Apply the suggestion without asking
        #[arg(long, short = 'y')]
        yes: bool,
        /// Talk to a running `coscribe serve` instead of the providers directly
        #[arg(long)]
        remote: bool,
        /// Base URL of the server used with --remote (overrides `chat.endpoint`)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print the effective configuration and exit
    ShowConfig,

    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "coscribe", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_defaults_to_fix_grammar() {
        let cli = Cli::try_parse_from(["coscribe", "edit", "notes.md"]).unwrap();
        match cli.command {
            Commands::Edit { action, start, end, policy, yes, .. } => {
                assert_eq!(action, "Fix grammar");
                assert_eq!((start, end), (None, None));
                assert!(policy.is_none());
                assert!(!yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn policy_flag_accepts_lowercase_names() {
        let cli = Cli::try_parse_from([
            "coscribe", "edit", "notes.md", "--policy", "revalidate", "--start", "3", "--end", "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit { policy, start, end, .. } => {
                assert_eq!(policy, Some(ApplyPolicy::Revalidate));
                assert_eq!((start, end), (Some(3), Some(9)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["coscribe", "serve", "-vv", "--bind", "0.0.0.0:8080"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
