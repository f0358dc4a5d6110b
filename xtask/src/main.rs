use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for snes-frontend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy on every target
    Clippy,
    /// Run tests, optionally only for some modules
    Test {
        /// Config store unit tests and tests/config_test.rs
        #[arg(long)]
        config: bool,
        /// Display unit tests and tests/presenter_test.rs
        #[arg(long)]
        display: bool,
        /// Input binding unit tests
        #[arg(long)]
        input: bool,
    },
    /// Run frame and config benchmarks
    Bench,
    /// Run the frontend against a scratch configuration directory
    Run {
        /// Directory used as XDG_CONFIG_HOME
        #[arg(long, default_value = "target/xdg-config")]
        config_home: String,
        /// Log filter passed through RUST_LOG
        #[arg(long, default_value = "info")]
        log: String,
        #[arg(long)]
        release: bool,
    },
}

/// A module filter and the integration test that covers it
struct TestGroup {
    name: &'static str,
    module: &'static str,
    integration: Option<&'static str>,
}

const TEST_GROUPS: [TestGroup; 3] = [
    TestGroup {
        name: "Config",
        module: "config",
        integration: Some("config_test"),
    },
    TestGroup {
        name: "Display",
        module: "display",
        integration: Some("presenter_test"),
    },
    TestGroup {
        name: "Input",
        module: "input",
        integration: None,
    },
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy => run_clippy(),
        Commands::Test {
            config,
            display,
            input,
        } => run_test([config, display, input]),
        Commands::Bench => cargo(&["bench", "--bench", "frame_bench"]),
        Commands::Run {
            config_home,
            log,
            release,
        } => run_frontend(Path::new(&config_home), &log, release),
    }
}

fn run_ci() -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true))?;
    run_task("Clippy", run_clippy)?;
    run_task("Build", || cargo(&["build", "--workspace"]))?;
    run_task("Test", || run_test([false; 3]))?;

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    if check {
        cargo(&["fmt", "--all", "--", "--check"])
    } else {
        cargo(&["fmt", "--all"])
    }
}

fn run_clippy() -> Result<()> {
    cargo(&["clippy", "--all-targets", "--workspace", "--", "-D", "warnings"])
}

fn run_test(selected: [bool; 3]) -> Result<()> {
    if !selected.contains(&true) {
        return cargo(&["test"]);
    }

    let mut failed = Vec::new();

    for (group, _) in TEST_GROUPS.iter().zip(selected).filter(|(_, on)| *on) {
        println!("{} Running {} tests...", "→".blue(), group.name.bold());

        let mut result = cargo(&["test", "--lib", group.module]);
        if let (true, Some(integration)) = (result.is_ok(), group.integration) {
            result = cargo(&["test", "--test", integration]);
        }

        match result {
            Ok(()) => println!("{} {} tests passed\n", "✓".green(), group.name),
            Err(_) => {
                println!("{} {} tests failed\n", "✗".red(), group.name);
                failed.push(group.name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Tests failed: {}", failed.join(", "))
    }
}

fn run_frontend(config_home: &Path, log: &str, release: bool) -> Result<()> {
    println!("{}", "=== Frontend Run ===".bold().blue());

    std::fs::create_dir_all(config_home)?;
    let config_home = config_home.canonicalize()?;

    println!(
        "{} Config file: {}",
        "→".blue(),
        config_home
            .join("snes9x")
            .join("snes9x.conf")
            .display()
            .to_string()
            .cyan()
    );
    println!("{} Log filter: {}\n", "→".blue(), log.cyan());

    let mut cmd = Command::new("cargo");
    cmd.arg("run");
    if release {
        cmd.arg("--release");
    }
    cmd.env("XDG_CONFIG_HOME", &config_home).env("RUST_LOG", log);

    execute_command(&mut cmd)
}

fn run_task<F>(name: &str, task: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            println!("{} ({:.2}s)", "✓".green().bold(), start.elapsed().as_secs_f64());
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    execute_command(&mut cmd)
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommands() {
        assert!(Cli::try_parse_from(["x", "test", "--display", "--input"]).is_ok());
        assert!(Cli::try_parse_from(["x", "run", "--log", "debug"]).is_ok());
        assert!(Cli::try_parse_from(["x", "pre-commit"]).is_err());
        assert!(Cli::try_parse_from(["x", "test", "--doc"]).is_err());
    }
}
