use std::path::PathBuf;

use anyhow::{bail, Context};
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser as ClapParser;
use tracing::*;
use tracked_json::{syntax_error_finding, verify_locations, Finding, Severity, TrackedJson};

mod config;
mod logging;

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path to a netlist JSON file.
    input: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full location-index export JSON instead of a summary.
    #[arg(long)]
    dump_locations: bool,

    /// Skip the location-index self-verification pass.
    #[arg(long)]
    no_verify: bool,
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(input = ?cli.input);

    let config = config::load(cli.config.as_deref())?;

    let json_string = match std::fs::read_to_string(&cli.input) {
        Ok(file) => file,
        Err(e) => {
            error!(path = ?cli.input, "failed to read input");
            return Err(e)
                .with_context(|| format!("failed to read file `{}`", cli.input.display()));
        }
    };

    let path = cli.input.display().to_string();
    let document = TrackedJson::loads(&json_string);

    if let Some(parse_error) = document.error() {
        let finding = syntax_error_finding(parse_error);
        let help = format!("context: …{}…", parse_error.snippet(config.snippet_radius));
        report_finding(&path, &json_string, &finding, Some(help))?;
        bail!("failed to parse netlist JSON");
    }

    if config.verify_locations && !cli.no_verify {
        let problems = verify_locations(&json_string, document.locations());
        if !problems.is_empty() {
            for problem in &problems {
                warn!(%problem, "location index inconsistency");
            }
            bail!(
                "location index failed self-verification with {} problems",
                problems.len()
            );
        }
        debug!("location index passed self-verification");
    }

    if cli.dump_locations {
        println!("{}", document.to_export_json()?);
        return Ok(());
    }

    info!(locations = document.locations().len(), "netlist JSON parsed");
    println!(
        "{path}: OK ({} tracked locations)",
        document.locations().len()
    );

    Ok(())
}

fn report_finding(
    path: &String,
    src: &str,
    finding: &Finding,
    help: Option<String>,
) -> anyhow::Result<()> {
    let (kind, color) = match finding.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };
    let offset = finding
        .location
        .as_ref()
        .map(|loc| (loc.start_character_number - 1).min(src.len()))
        .unwrap_or(0);

    let mut report = Report::build(kind, path, offset).with_message(&finding.message);
    if let Some(loc) = &finding.location {
        let range = (loc.start_character_number - 1).min(src.len())
            ..loc.end_character_number.min(src.len());
        report = report.with_label(Label::new((path, range)).with_color(color));
    }
    if let Some(help) = help {
        report = report.with_help(help);
    }
    report.finish().print((path, Source::from(src)))?;
    Ok(())
}
