//! specsheet - host hardware inventory reports
//!
//! Collects CPU, GPU, RAM, motherboard, storage and OS details from the
//! running host and renders them as a text or JSON report. Collection is
//! best-effort: each subsystem fails on its own, and a degraded report is
//! always preferred over no report.

mod config;
mod hardware;
mod report;
mod source;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::report::InventoryReport;

#[cfg(target_os = "windows")]
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
#[cfg(target_os = "windows")]
use windows_sys::Win32::Security::{
    GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
};
#[cfg(target_os = "windows")]
use windows_sys::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, SetConsoleCP, SetConsoleMode, SetConsoleOutputCP,
    ENABLE_PROCESSED_OUTPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING, ENABLE_WRAP_AT_EOL_OUTPUT,
    STD_ERROR_HANDLE, STD_OUTPUT_HANDLE,
};
#[cfg(target_os = "windows")]
use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

/// specsheet - inventory your PC hardware into a report
#[derive(Parser)]
#[command(name = "specsheet")]
#[command(author = "ForgeMyPC")]
#[command(version)]
#[command(about = "Inventory your PC hardware into a text or JSON report")]
struct Cli {
    /// Report format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report to this path instead of the default location
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report without writing a file
    #[arg(long, default_value_t = false)]
    no_file: bool,

    /// Per-query timeout for management interface probes, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn default_file_name(self) -> &'static str {
        match self {
            OutputFormat::Text => "specsheet.txt",
            OutputFormat::Json => "specsheet.json",
        }
    }
}

fn main() -> Result<()> {
    #[cfg(target_os = "windows")]
    init_windows_console();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|err| {
        warn!("could not load config, using defaults: {err:#}");
        Config::default()
    });

    let format = cli.format.unwrap_or_else(|| configured_format(&config));
    let timeout = Duration::from_secs(cli.timeout_secs.unwrap_or(config.probe.timeout_secs));

    let source = source::connect(timeout);
    if let Err(err) = &source {
        println!(
            "{} {}",
            "Management interface unavailable:".bright_yellow(),
            err.to_string().bright_yellow()
        );
        println!(
            "{}",
            "Continuing with a degraded report (CPU and OS only).".bright_black()
        );
    }

    let report = InventoryReport::collect(match &source {
        Ok(source) => Ok(source.as_ref()),
        Err(err) => Err(err),
    });

    let rendered = match format {
        OutputFormat::Text => report::text::render(&report),
        OutputFormat::Json => {
            report::json::render(&report).context("failed to serialize the report")?
        }
    };

    if !cli.no_file {
        let path = output_path(&cli, &config, format);
        fs::write(&path, &rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!(
            "{} {}",
            "Report saved to".bright_green(),
            path.display().to_string().bright_green()
        );
    }

    println!("\n{rendered}");

    if report.has_failures() {
        print_privilege_hint();
    }

    Ok(())
}

fn configured_format(config: &Config) -> OutputFormat {
    match config.output.format.to_ascii_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "text" => OutputFormat::Text,
        other => {
            warn!("unrecognized output.format {other:?} in config, using text");
            OutputFormat::Text
        }
    }
}

fn output_path(cli: &Cli, config: &Config, format: OutputFormat) -> PathBuf {
    if let Some(path) = &cli.output {
        return path.clone();
    }
    match &config.output.directory {
        Some(directory) => directory.join(format.default_file_name()),
        None => PathBuf::from(format.default_file_name()),
    }
}

/// Several subsystem queries (DMI tables, disk enumeration) commonly need
/// administrative rights; say so once when anything came back degraded.
fn print_privilege_hint() {
    #[cfg(target_os = "windows")]
    if is_windows_elevated() {
        return;
    }

    println!(
        "{}",
        "Some sections could not be collected. Re-running with elevated privileges (Administrator/root) may produce a more complete report."
            .bright_yellow()
    );
}

#[cfg(target_os = "windows")]
fn init_windows_console() {
    // Best-effort enabling of UTF-8 and ANSI/VT sequences in legacy hosts.
    // If the handle isn't a console (e.g., redirected), these calls fail
    // harmlessly.
    unsafe {
        let _ = SetConsoleOutputCP(65001);
        let _ = SetConsoleCP(65001);

        for handle_id in [STD_OUTPUT_HANDLE, STD_ERROR_HANDLE] {
            let handle = GetStdHandle(handle_id);
            if handle.is_null() || handle == INVALID_HANDLE_VALUE {
                continue;
            }

            let mut mode: u32 = 0;
            if GetConsoleMode(handle, &mut mode) == 0 {
                continue;
            }

            let desired = mode
                | ENABLE_PROCESSED_OUTPUT
                | ENABLE_WRAP_AT_EOL_OUTPUT
                | ENABLE_VIRTUAL_TERMINAL_PROCESSING;
            let _ = SetConsoleMode(handle, desired);
        }
    }
}

#[cfg(target_os = "windows")]
fn is_windows_elevated() -> bool {
    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return false;
        }

        let mut elevation: TOKEN_ELEVATION = std::mem::zeroed();
        let mut returned: u32 = 0;
        let ok = GetTokenInformation(
            token,
            TokenElevation,
            &mut elevation as *mut _ as *mut _,
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        ) != 0;
        let _ = CloseHandle(token);

        ok && elevation.TokenIsElevated != 0
    }
}
