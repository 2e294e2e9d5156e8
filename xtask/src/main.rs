//! Development automation tasks for phar-packager.
//!
//! # Usage
//!
//! ```bash
//! cargo xtask coverage                    # Run test coverage with cargo-tarpaulin
//! cargo xtask platform-fixture /tmp/plat  # Create a local platform bundle repository
//! ```
//!
//! A platform fixture lets `<platform>` blocks be built offline:
//!
//! ```bash
//! phar-packager build --platform-url file:///tmp/plat
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development automation tasks for phar-packager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test coverage with cargo-tarpaulin
    Coverage {
        /// Output format (html, json, xml, or lcov)
        #[arg(long, short, default_value = "html")]
        format: String,
        /// Minimum coverage threshold (0-100)
        #[arg(long)]
        fail_under: Option<u8>,
        /// Also run the git-backed integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Create a git repository laid out like the platform bundle
    PlatformFixture {
        /// Directory to create; must not exist yet
        dir: PathBuf,
        /// Tag the initial commit with this version
        #[arg(long, default_value = "12.1")]
        version: String,
    },
}

/// Files of a minimal platform bundle, relative to the repository root.
const PLATFORM_FILES: &[&str] = &[
    "libraries/import.php",
    "libraries/import.legacy.php",
    "libraries/loader.php",
    "libraries/platform.php",
    "libraries/joomla/factory.php",
    "libraries/joomla/database/database.php",
    "libraries/joomla/database/driver/mysql.php",
    "libraries/joomla/log/log.php",
    "libraries/legacy/database/table.php",
    "libraries/phpmailer/phpmailer.php",
    "libraries/phputf8/utf8.php",
    "libraries/simplepie/simplepie.php",
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Coverage {
            format,
            fail_under,
            integration,
        } => {
            let workspace_root = workspace_root()?;
            env::set_current_dir(&workspace_root).with_context(|| {
                format!(
                    "Failed to change to workspace root: {}",
                    workspace_root.display()
                )
            })?;
            run_coverage(&format, fail_under, integration)
        }
        Commands::PlatformFixture { dir, version } => run_platform_fixture(&dir, &version),
    }
}

/// Find the workspace root directory.
fn workspace_root() -> Result<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run 'cargo locate-project'")?;

    if !output.status.success() {
        bail!("Failed to locate workspace root");
    }

    let path = String::from_utf8(output.stdout).context("Invalid UTF-8 in cargo output")?;
    let path = PathBuf::from(path.trim());

    path.parent()
        .map(|p| p.to_path_buf())
        .context("Failed to get parent directory of Cargo.toml")
}

/// Run test coverage with cargo-tarpaulin.
fn run_coverage(format: &str, fail_under: Option<u8>, integration: bool) -> Result<()> {
    if !is_command_available("cargo-tarpaulin") {
        println!("cargo-tarpaulin is not installed.");
        println!("Install with: cargo install cargo-tarpaulin");
        bail!("cargo-tarpaulin not found");
    }

    let (out, report_path) = match format.to_lowercase().as_str() {
        "html" => ("Html", "target/tarpaulin/tarpaulin-report.html"),
        "json" => ("Json", "target/tarpaulin/tarpaulin-report.json"),
        "xml" => ("Xml", "target/tarpaulin/cobertura.xml"),
        "lcov" => ("Lcov", "target/tarpaulin/lcov.info"),
        _ => bail!("Unknown format '{}'. Use: html, json, xml, or lcov", format),
    };

    let mut args: Vec<String> = ["tarpaulin", "--out", out, "--output-dir", "target/tarpaulin"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if integration {
        args.push("--features".to_string());
        args.push("integration-tests".to_string());
    }
    if let Some(threshold) = fail_under {
        args.push("--fail-under".to_string());
        args.push(threshold.to_string());
    }

    println!("Running coverage...");
    let status = run_command("cargo", &args, None)?;
    if !status.success() {
        if fail_under.is_some() {
            bail!("Coverage is below the required threshold");
        }
        bail!("Coverage failed");
    }

    println!();
    println!("Coverage report: {}", report_path);
    Ok(())
}

/// Create a platform bundle repository at `dir` tagged `version`.
fn run_platform_fixture(dir: &Path, version: &str) -> Result<()> {
    if dir.exists() {
        bail!("{} already exists", dir.display());
    }
    if !is_command_available("git") {
        bail!("git not found on PATH");
    }

    for rel in PLATFORM_FILES {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, format!("<?php\n// {}\n", rel))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let git = |args: &[&str]| -> Result<()> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let status = run_command("git", &args, Some(dir))?;
        if !status.success() {
            bail!("git {} failed", args.join(" "));
        }
        Ok(())
    };
    git(&["init", "-q"])?;
    git(&["checkout", "-q", "-b", "master"])?;
    git(&["add", "-A"])?;
    git(&[
        "-c",
        "user.name=xtask",
        "-c",
        "user.email=xtask@localhost",
        "commit",
        "-q",
        "-m",
        "platform fixture",
    ])?;
    git(&["tag", version])?;

    let absolute = fs::canonicalize(dir)?;
    println!("Platform fixture {} at {}", version, absolute.display());
    println!("Build with: phar-packager build --platform-url file://{}", absolute.display());
    Ok(())
}

/// Check if a command is available in PATH.
fn is_command_available(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> Result<ExitStatus> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    command
        .status()
        .with_context(|| format!("Failed to run {} {}", program, args.join(" ")))
}
