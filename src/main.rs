//! artifactory-vfs - browse an Artifactory repository from the command line
//!
//! Thin front end over the library: every command builds a path in the
//! configured repository and queries it, `tree` inside a cache scope.

use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use std::env;
use std::io::Write;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use artifactory_vfs::{ArtifactContext, ArtifactoryConfig, ScopeStack, VfsError, VirtualPath};

/// CLI command
#[derive(Debug)]
enum Command {
    /// List the immediate children of a folder
    Ls { path: String },
    /// Show metadata for one path
    Stat { path: String },
    /// Print a whole subtree, listing each folder once
    Tree { path: String },
    /// Write a file's content to stdout
    Cat { path: String },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"artifactory-vfs - Browse an Artifactory repository

USAGE:
    artifactory-vfs ls [path]
    artifactory-vfs stat <path>
    artifactory-vfs tree [path]
    artifactory-vfs cat <path>
    artifactory-vfs help

COMMANDS:
    ls      List the immediate children of a folder
    stat    Show type, size and modification time of a path
    tree    Print every file and folder under a path
    cat     Download a file and write it to stdout
    help    Show this help message

EXAMPLES:
    artifactory-vfs ls builds/main
    artifactory-vfs tree builds/main/1234
    artifactory-vfs cat builds/main/1234/log.txt > log.txt

ENVIRONMENT:
    ARTIFACTORY_URL            Server base URL, e.g. https://host/artifactory
    ARTIFACTORY_REPOSITORY     Repository key
    ARTIFACTORY_TOKEN          Access token (or USERNAME + PASSWORD)
    ARTIFACTORY_USERNAME       Basic auth user
    ARTIFACTORY_PASSWORD       Basic auth password
    ARTIFACTORY_TIMEOUT_SECS   Request timeout (default: 30)
    ARTIFACTORY_MAX_RETRIES    Retries for transient failures (default: 3)
    RUST_LOG                   Log level (trace, debug, info, warn, error)

When ARTIFACTORY_URL is unset, configuration is read from
artifactory-vfs/config.json in the platform config directory
(~/.config on Linux, ~/Library/Application Support on macOS).
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    let path_arg = |required: bool| -> Result<String> {
        match args.get(2) {
            Some(path) => Ok(path.clone()),
            None if required => Err(anyhow!("Usage: artifactory-vfs {} <path>", args[1])),
            None => Ok(String::new()),
        }
    };

    match args[1].as_str() {
        "ls" => Ok(Command::Ls {
            path: path_arg(false)?,
        }),
        "stat" => Ok(Command::Stat {
            path: path_arg(true)?,
        }),
        "tree" => Ok(Command::Tree {
            path: path_arg(false)?,
        }),
        "cat" => Ok(Command::Cat {
            path: path_arg(true)?,
        }),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

async fn print_entry(entry: &VirtualPath, scope: &ScopeStack, indent: usize) {
    if entry.is_directory(scope).await {
        println!("{:indent$}{}/", "", entry.name(), indent = indent);
    } else {
        println!(
            "{:indent$}{:<40} {:>12}  {}",
            "",
            entry.name(),
            entry.length(scope).await,
            format_millis(entry.last_modified(scope).await),
            indent = indent
        );
    }
}

async fn ls(root: &VirtualPath) {
    let scope = ScopeStack::new();
    let mut children = root.list(&scope).await;
    children.sort_by(|a, b| a.key().cmp(b.key()));
    for child in &children {
        print_entry(child, &scope, 0).await;
    }
}

async fn stat(path: &VirtualPath) -> Result<()> {
    let scope = ScopeStack::new();
    let kind = if path.is_directory(&scope).await {
        "folder"
    } else if path.is_file(&scope).await {
        "file"
    } else {
        return Err(anyhow!("{}: no such file or folder", path.key()));
    };

    println!("path:      {}", path.key());
    println!("type:      {}", kind);
    println!("size:      {}", path.length(&scope).await);
    println!("modified:  {}", format_millis(path.last_modified(&scope).await));
    println!("url:       {}", path.to_uri()?);
    Ok(())
}

async fn tree(root: &VirtualPath) -> Result<()> {
    let start = root.clone();
    root.run(&ScopeStack::new(), |scope| async move {
        // Depth-first, siblings in name order
        let mut pending = vec![(start, 0usize)];
        while let Some((entry, depth)) = pending.pop() {
            if depth > 0 {
                print_entry(&entry, &scope, (depth - 1) * 2).await;
            }
            if depth == 0 || entry.is_directory(&scope).await {
                let mut children = entry.list(&scope).await;
                children.sort_by(|a, b| b.key().cmp(a.key()));
                pending.extend(children.into_iter().map(|child| (child, depth + 1)));
            }
        }
        scope.log_metrics();
        Ok::<_, VfsError>(())
    })
    .await?;
    Ok(())
}

async fn cat(path: &VirtualPath) -> Result<()> {
    let content = path
        .open(&ScopeStack::new())
        .await
        .with_context(|| format!("Failed to read {}", path.key()))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging on stderr so command output stays clean
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command
    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if let Command::Help = command {
        print_help();
        return Ok(());
    }

    let config = match ArtifactoryConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    let context =
        ArtifactContext::connect(config).context("Failed to create Artifactory client")?;
    let path = |key: &str| context.path(key);

    match command {
        Command::Ls { path: key } => ls(&path(&key)).await,
        Command::Stat { path: key } => stat(&path(&key)).await?,
        Command::Tree { path: key } => tree(&path(&key)).await?,
        Command::Cat { path: key } => cat(&path(&key)).await?,
        Command::Help => print_help(),
    }

    Ok(())
}
