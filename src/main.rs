use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;

/// Environment variable holding a `tracing` filter directive, e.g. `twig=debug`
const LOG_ENV: &str = "TWIG_LOG";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A minimal version control system",
    long_about = "A small version control system with content-addressed storage, \
    a staging area, branches and three-way merges. \
    State lives in a .twig directory at the root of the working tree.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase log verbosity (-v info, -vv debug)"
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .twig directory in the current directory or at the \
        specified path and records the initial commit."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file",
        long_about = "This command removes a file from the staging area and drops its stored \
        content when no commit refers to it. The working tree file is left alone."
    )]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "commit", about = "Record the staged changes on the current branch")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "branch", about = "Create, delete or list branches")]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },
    #[command(name = "checkout", about = "Switch to another branch")]
    Checkout {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to a commit",
        long_about = "This command points the current branch at the given commit, which may be \
        abbreviated to any unique prefix, and restores that commit's files."
    )]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "merge", about = "Merge another branch into the current one")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(name = "log", about = "Show the current branch history")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "hash-object",
        about = "Compute a file's digest and optionally store its content"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the content to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "cat-file", about = "Print stored content by digest")]
    CatFile {
        #[arg(index = 1, help = "The full content digest")]
        digest: String,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    #[command(about = "Create a branch at the current head")]
    Create { name: String },
    #[command(about = "Delete a branch, keeping its commits")]
    Delete { name: String },
    #[command(about = "List all branches")]
    List,
}

impl Commands {
    fn is_read_only(&self) -> bool {
        matches!(
            self,
            Commands::Log
                | Commands::GlobalLog
                | Commands::Find { .. }
                | Commands::Status
                | Commands::CatFile { .. }
                | Commands::HashObject { write: false, .. }
                | Commands::Branch {
                    action: BranchAction::List
                }
        )
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(format!("twig={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(repository: &Repository, command: Commands) -> Result<()> {
    match command {
        Commands::Init { .. } => repository.init(),
        Commands::Add { paths } => repository.add(&paths),
        Commands::Rm { file } => repository.rm(&file),
        Commands::Commit { message } => repository.commit(&message),
        Commands::Branch { action } => match action {
            BranchAction::Create { name } => repository.create_branch(&name),
            BranchAction::Delete { name } => repository.delete_branch(&name),
            BranchAction::List => repository.list_branches(),
        },
        Commands::Checkout { branch } => repository.checkout(&branch),
        Commands::Reset { commit } => repository.reset(&commit),
        Commands::Merge { branch } => repository.merge(&branch),
        Commands::Log => repository.log(),
        Commands::GlobalLog => repository.global_log(),
        Commands::Find { message } => repository.find(&message),
        Commands::Status => repository.status(),
        Commands::HashObject { write, file } => repository.hash_object(&file, write),
        Commands::CatFile { digest } => repository.cat_file(&digest),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pwd = std::env::current_dir()?;
    let repository = match &cli.command {
        Commands::Init { path } => {
            let path = path.as_ref().map(PathBuf::from).unwrap_or(pwd);
            Repository::new(&path, Box::new(std::io::stdout()))?
        }
        _ => Repository::open(&pwd, Box::new(std::io::stdout()))?,
    };

    let read_only = cli.command.is_read_only();
    run(&repository, cli.command)?;

    // state is only written back once the command has succeeded
    if !read_only {
        repository.save()?;
    }
    repository.writer().flush()?;

    Ok(())
}
