use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pasls_manager::update::{self, PlatformTarget, ServerManager, UpdateStatus};
use pasls_manager::Config;

#[derive(Parser, Debug)]
#[command(name = "pasls-manager")]
#[command(about = "Install and update the Pascal Language Server binary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (defaults to <config dir>/pasls-manager/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the pasls binary and its VERSION file
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Treat the binary as manually managed (same as manageBinary = false)
    #[arg(long, global = true)]
    unmanaged: bool,

    /// Host OS identifier: osx, linux, windows (defaults to this machine)
    #[arg(long, global = true)]
    os: Option<String>,

    /// Host CPU identifier: x64, x32, arm64 (defaults to this machine)
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Hide the download progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a newer pasls release is available
    Check,

    /// Install the latest release if it differs from the installed one
    Update,

    /// Install the latest release unconditionally
    Install,

    /// Print the path of the pasls binary
    Path,

    /// Show the storage directory and installed version
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    if cli.unmanaged {
        config.manage_binary = false;
    }

    let platform = platform_target(cli.os.as_deref(), cli.arch.as_deref());
    let manager = ServerManager::new(&config, platform, !cli.quiet)
        .context("Failed to create HTTP client")?;

    match cli.command.unwrap_or(Command::Update) {
        Command::Check => run_check_command(&manager),
        Command::Update => Ok(update::perform_update(&manager)?),
        Command::Install => Ok(update::perform_install(&manager)?),
        Command::Path => {
            println!("{}", manager.layout().binary_path().display());
            Ok(())
        }
        Command::Status => run_status_command(&manager, &config),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "pasls_manager=warn",
        1 => "pasls_manager=info",
        _ => "pasls_manager=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn platform_target(os: Option<&str>, arch: Option<&str>) -> PlatformTarget {
    let current = PlatformTarget::current();
    PlatformTarget::new(
        os.map(update::Os::from_host).unwrap_or(current.os),
        arch.map(update::Arch::from_host).unwrap_or(current.arch),
    )
}

fn run_check_command(manager: &ServerManager) -> Result<()> {
    let status = manager.check();
    if status.needs_update() {
        println!("{} {}", "↑".yellow(), status);
        println!("  Run `pasls-manager update` to install");
    } else if status == UpdateStatus::Unknown {
        println!("{} {}", "⚠".yellow(), status);
    } else {
        println!("{} {}", "✓".green(), status);
    }
    Ok(())
}

fn run_status_command(manager: &ServerManager, config: &Config) -> Result<()> {
    let layout = manager.layout();
    let binary = layout.binary_path();

    println!("{}", "PASLS".bold());
    println!("   platform  {}", manager.platform());
    println!("   storage   {}", layout.root().display());
    println!(
        "   binary    {} {}",
        binary.display(),
        if layout.binary_exists() {
            "(present)".green()
        } else {
            "(missing)".red()
        }
    );
    println!(
        "   version   {}",
        layout
            .installed_version()
            .unwrap_or_else(|| "none".dimmed().to_string())
    );
    println!(
        "   managed   {}",
        if config.manage_binary { "yes" } else { "no" }
    );
    Ok(())
}
