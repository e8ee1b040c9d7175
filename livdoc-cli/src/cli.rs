//! Argument parsing and the single `livdoc` command.

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use tracing::{info, warn};

use livdoc_lint::output::{write_human, write_json};
use livdoc_lint::registry::run_all;
use livdoc_lint::{FsSourceConfig, LintConfig, RunReport, RunStatus, ValidatorKind, discover_glossary};

use crate::logging;

/// Consistency checks for the Denmark living knowledge base
#[derive(Parser, Debug)]
#[command(name = "livdoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Markdown file or directory to check
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Glossary file (default: discovered under PATH)
    #[arg(short, long)]
    pub glossary: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug); also lists warnings
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only check the top level of PATH
    #[arg(long)]
    pub no_recursive: bool,

    /// Which validator to run
    #[arg(long, value_enum, default_value_t = Check::All)]
    pub check: Check,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// Glob of files to skip (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Check {
    Terminology,
    Acronyms,
    Translations,
    All,
}

impl Check {
    fn kinds(self) -> Vec<ValidatorKind> {
        match self {
            Self::Terminology => vec![ValidatorKind::Terminology],
            Self::Acronyms => vec![ValidatorKind::Acronyms],
            Self::Translations => vec![ValidatorKind::Translations],
            Self::All => ValidatorKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

pub fn run() -> anyhow::Result<RunReport> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    execute(&cli, &mut std::io::stdout().lock())
}

/// Process exit status: 0 when the run passed or only warned, 1 for
/// error-severity findings or a run that could not complete.
#[must_use]
pub fn exit_status(outcome: &anyhow::Result<RunReport>) -> u8 {
    match outcome {
        Ok(report) if !report.has_errors() => 0,
        _ => 1,
    }
}

/// Run the selected validators and render the report to `out`.
fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<RunReport> {
    let glossary_path = cli.glossary.clone().or_else(|| discover_glossary(&cli.path));
    if let Some(path) = &glossary_path {
        info!(glossary = %path.display(), "using glossary");
    } else {
        warn!("no glossary found, glossary checks are skipped");
    }

    let config = LintConfig::with_glossary(glossary_path);
    let mut fs_config = FsSourceConfig::with_paths(vec![cli.path.clone()]);
    fs_config.recursive = !cli.no_recursive;
    fs_config.exclude.clone_from(&cli.exclude);

    let report = run_all(&cli.check.kinds(), &config, &fs_config)?;
    match cli.format {
        Format::Json => write_json(&report, out)?,
        Format::Human => {
            write_human(&report, cli.verbose > 0, out)?;
            writeln!(out)?;
            writeln!(out, "{}", status_line(&report))?;
        }
    }
    Ok(report)
}

fn status_line(report: &RunReport) -> String {
    let label = report.status.label();
    let label = match report.status {
        RunStatus::Passed => label.green().bold(),
        RunStatus::Warnings => label.yellow().bold(),
        RunStatus::Errors => label.red().bold(),
    };
    format!(
        "{label}: {} error(s), {} warning(s)",
        report.total_errors, report.total_warnings
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    const GLOSSARY: &str = "# Glossary\n\n### CPR-nummer\n**English**: Civil Registration Number\n";

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("livdoc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.check, Check::All);
        assert_eq!(cli.format, Format::Human);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_recursive);
        assert!(cli.glossary.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "docs",
            "-g",
            "meta/glossary.md",
            "-vv",
            "--no-recursive",
            "--check",
            "acronyms",
            "--format",
            "json",
            "--exclude",
            "drafts/*",
            "--exclude",
            "*.bak.md",
        ]);
        assert_eq!(cli.path, PathBuf::from("docs"));
        assert_eq!(cli.glossary, Some(PathBuf::from("meta/glossary.md")));
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_recursive);
        assert_eq!(cli.check.kinds(), vec![ValidatorKind::Acronyms]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.exclude, vec!["drafts/*", "*.bak.md"]);
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        assert!(Cli::try_parse_from(["livdoc", "--check", "links"]).is_err());
    }

    #[test]
    fn test_clean_docs_pass() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "Register your address at the town hall.\n").unwrap();
        let cli = parse(&[tmp.path().to_str().unwrap()]);

        let mut out = Vec::new();
        let report = execute(&cli, &mut out).unwrap();
        assert_eq!(report.status, RunStatus::Passed);
        assert!(String::from_utf8(out).unwrap().contains("PASSED"));
    }

    #[test]
    fn test_discovered_glossary_drives_json_report() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("metadata")).unwrap();
        fs::write(tmp.path().join("metadata/glossary.md"), GLOSSARY).unwrap();
        fs::write(
            tmp.path().join("a.md"),
            "Get your **cpr-nummer** early.\n\nThe cpr-nummer is on the card.\n",
        )
        .unwrap();
        let cli = parse(&[
            tmp.path().to_str().unwrap(),
            "--check",
            "terminology",
            "--format",
            "json",
        ]);

        let mut out = Vec::new();
        let report = execute(&cli, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["outcomes"][0]["glossary_loaded"], true);
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let cli = parse(&[tmp.path().join("nope").to_str().unwrap()]);
        let outcome = execute(&cli, &mut Vec::new());
        assert!(outcome.is_err());
        assert_eq!(exit_status(&outcome), 1);
    }

    #[test]
    fn test_exit_status_follows_error_findings() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("clean.md"), "Pay the VAT on imports.\n").unwrap();
        let cli = parse(&[tmp.path().to_str().unwrap(), "--check", "acronyms"]);
        let warnings_only = execute(&cli, &mut Vec::new());
        assert_eq!(warnings_only.as_ref().unwrap().status, RunStatus::Warnings);
        assert_eq!(exit_status(&warnings_only), 0);

        fs::write(tmp.path().join("tax.md"), "SKAT writes.\nAnswer SKAT.\n").unwrap();
        let with_errors = execute(&cli, &mut Vec::new());
        assert_eq!(exit_status(&with_errors), 1);
    }
}
