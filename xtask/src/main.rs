use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for scenerep")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests and docs, in that order
    Ci,
    Fmt,
    Clippy,
    Test,
    Doc,
    /// Bake, check and load a cache file through scenerep-cli
    Smoke {
        /// Where to bake the cache; defaults to target/smoke/demo
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci => {
            fmt()?;
            clippy()?;
            test()?;
            doc()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::Smoke { path } => smoke(path.unwrap_or_else(|| "target/smoke/demo".into()))?,
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

fn smoke(path: PathBuf) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let path = path.to_string_lossy().into_owned();
    for step in [
        vec!["bake", path.as_str(), "--bodies", "4"],
        vec!["check", path.as_str()],
        vec!["load", path.as_str()],
        vec!["world", "--occurrences", "6"],
    ] {
        let mut args = vec!["run", "--quiet", "-p", "scenerep-cli", "--"];
        args.extend(step.iter().copied());
        cargo(step[0], &args)?;
    }
    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("{step} failed");
    }
    Ok(())
}
