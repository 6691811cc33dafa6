//! Merge-queue command runner.
//!
//! Applies one already-parsed operator command to a pull request state file,
//! writes the state back if the handler persisted anything, then prints the
//! comments and label events it produced (one JSON object per line). Nothing
//! is printed when the write fails.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use mergebot::core::types::Polarity;
use mergebot::dispatch::{Command, CommandContext, DispatchEnv, dispatch};
use mergebot::exit_codes;
use mergebot::io::config::{load_config, write_config};
use mergebot::io::review_store::{FileReview, load_states_index};
use mergebot::logging;
use mergebot::repo::RepoConfig;
use mergebot::review::RepoStatesIndex;

#[derive(Parser)]
#[command(
    name = "mergebot",
    version,
    about = "Apply merge-queue commands to pull request state"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Apply one command to a review state file.
    Apply(ApplyArgs),
    /// Write a default repository config.
    InitConfig {
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct ApplyArgs {
    /// Review state JSON file to update.
    #[arg(long)]
    state: PathBuf,
    /// Repository config (TOML). Defaults apply when omitted or missing.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of review files consulted for in-flight builds.
    #[arg(long)]
    index_dir: Option<PathBuf>,
    /// The bot's own identity.
    #[arg(long)]
    caller: String,
    /// Identity that wrote the command.
    #[arg(long)]
    author: String,
    /// Replay mode: suppress informational comments.
    #[arg(long)]
    batch: bool,
    #[command(subcommand)]
    op: Op,
}

#[derive(Subcommand)]
enum Op {
    /// `r+` or `r=<approver>`.
    Approve {
        /// Approve on behalf of this user (defaults to the author).
        #[arg(long)]
        approver: Option<String>,
        /// Commit the approval is pinned to.
        #[arg(long, default_value = "")]
        sha: String,
    },
    /// `r-`
    Reject,
    /// `p=N`
    Priority { value: i64 },
    /// `try` / `try-`
    Try {
        #[arg(long)]
        choose: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// `rollup` / `rollup-`
    Rollup {
        #[arg(long)]
        off: bool,
    },
    /// `delegate=<user>`
    Delegate { user: String },
    /// `delegate+`
    DelegateAuthor { user: String },
    /// `delegate-`
    Undelegate,
    Retry,
    Clean,
    Ping,
    StillHere,
    /// `treeclosed=N`
    Treeclosed { threshold: u32 },
    /// `treeclosed-`
    Treeopen,
}

impl Op {
    fn into_command(self, author: &str) -> Command {
        let polarity = |off: bool| {
            if off {
                Polarity::Negative
            } else {
                Polarity::Positive
            }
        };
        match self {
            Op::Approve { approver, sha } => Command::Approve {
                approver: approver.unwrap_or_else(|| author.to_string()),
                sha,
            },
            Op::Reject => Command::Reject,
            Op::Priority { value } => Command::Priority(value),
            Op::Try { choose, off } => Command::Try {
                polarity: polarity(off),
                choose,
            },
            Op::Rollup { off } => Command::Rollup(polarity(off)),
            Op::Delegate { user } => Command::DelegateTo(user),
            Op::DelegateAuthor { user } => Command::DelegateAuthor(user),
            Op::Undelegate => Command::Undelegate,
            Op::Retry => Command::Retry,
            Op::Clean => Command::Clean,
            Op::Ping => Command::Ping,
            Op::StillHere => Command::StillHere,
            Op::Treeclosed { threshold } => Command::TreeClosed(threshold),
            Op::Treeopen => Command::TreeOpen,
        }
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Apply(args) => cmd_apply(args),
        CliCommand::InitConfig { path, force } => cmd_init_config(&path, force),
    }
}

fn cmd_apply(args: ApplyArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RepoConfig::default(),
    };
    let states = match &args.index_dir {
        Some(dir) => load_states_index(dir).context("load states index")?,
        None => RepoStatesIndex::new(),
    };
    let mut review = FileReview::load(&args.state)?;

    let command = args.op.into_command(&args.author);
    let context = CommandContext {
        caller: &args.caller,
        author: &args.author,
        realtime: !args.batch,
    };
    let mut rng = rand::thread_rng();
    let mut env = DispatchEnv {
        config: &config,
        states: &states,
        rng: &mut rng,
    };
    let accepted = dispatch(&mut review, &command, &context, &mut env);

    let written = review.commit()?;
    for notification in review.outbox() {
        let line = serde_json::to_string(notification).context("serialize notification")?;
        println!("{}", line);
    }
    info!(command = command.name(), accepted, written, "command applied");

    Ok(if accepted {
        exit_codes::OK
    } else {
        exit_codes::REFUSED
    })
}

fn cmd_init_config(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &RepoConfig::default())?;
    Ok(exit_codes::OK)
}
