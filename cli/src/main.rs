//! manucheck CLI - manuscript formatting compliance tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use manucheck::{AnalysisReport, SectionLabel};

#[derive(Parser)]
#[command(name = "manucheck")]
#[command(version)]
#[command(about = "Check and fix manuscript formatting against a journal template", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a manuscript and print the findings
    Analyze {
        /// Template DOCX file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Manuscript DOCX file
        #[arg(value_name = "MANUSCRIPT")]
        manuscript: PathBuf,

        /// Write the report as JSON (stdout if no path given)
        #[arg(long, value_name = "FILE")]
        json: Option<Option<PathBuf>>,

        /// Print a paragraph-by-paragraph preview of both documents
        #[arg(long)]
        preview: bool,
    },

    /// Highlight every flagged paragraph in the manuscript
    Highlight {
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        #[arg(value_name = "MANUSCRIPT")]
        manuscript: PathBuf,

        /// Output file (defaults to <manuscript>_highlighted.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Apply the suggested corrections to the manuscript
    Correct {
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        #[arg(value_name = "MANUSCRIPT")]
        manuscript: PathBuf,

        /// Output file (defaults to <manuscript>_corrected.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Insert placeholder paragraphs for missing required sections
    Insert {
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        #[arg(value_name = "MANUSCRIPT")]
        manuscript: PathBuf,

        /// Output file (defaults to <manuscript>_sections.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Correct formatting, insert missing sections, and highlight the result
    Fix {
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        #[arg(value_name = "MANUSCRIPT")]
        manuscript: PathBuf,

        /// Output file (defaults to <manuscript>_fixed.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            template,
            manuscript,
            json,
            preview,
        } => cmd_analyze(&template, &manuscript, json, preview),
        Commands::Highlight {
            template,
            manuscript,
            output,
        } => cmd_highlight(&template, &manuscript, output.as_deref()),
        Commands::Correct {
            template,
            manuscript,
            output,
        } => cmd_correct(&template, &manuscript, output.as_deref()),
        Commands::Insert {
            template,
            manuscript,
            output,
        } => cmd_insert(&template, &manuscript, output.as_deref()),
        Commands::Fix {
            template,
            manuscript,
            output,
        } => cmd_fix(&template, &manuscript, output.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn run_analysis(template: &Path, manuscript: &Path) -> Result<AnalysisReport, Box<dyn std::error::Error>> {
    let template_bytes = fs::read(template)?;
    let manuscript_bytes = fs::read(manuscript)?;
    let report = manucheck::analyze(&template_bytes, &manuscript_bytes);
    if report.is_parse_failure() {
        return Err("could not parse the documents".into());
    }
    Ok(report)
}

fn cmd_analyze(
    template: &Path,
    manuscript: &Path,
    json: Option<Option<PathBuf>>,
    preview: bool,
) -> CliResult {
    if preview {
        let template_bytes = fs::read(template)?;
        let manuscript_bytes = fs::read(manuscript)?;
        println!("{}", "Template preview".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}", manucheck::preview(&template_bytes, 10)?);
        println!();
        println!("{}", "Manuscript preview".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}", manucheck::preview(&manuscript_bytes, 10)?);
        println!();
    }

    let report = run_analysis(template, manuscript)?;

    if let Some(json_target) = json {
        let rendered = serde_json::to_string_pretty(&report)?;
        match json_target {
            Some(path) => {
                fs::write(&path, &rendered)?;
                println!("{} {}", "Saved to".green(), path.display());
            }
            None => println!("{rendered}"),
        }
        return Ok(());
    }

    if report.findings.is_empty() && report.missing_sections.is_empty() {
        println!("{}", "No formatting issues found".green().bold());
        return Ok(());
    }

    println!("{}", "Findings".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for finding in &report.findings {
        let kind = serde_json::to_value(finding.kind)?;
        let pages: Vec<String> = finding.pages.iter().map(|p| p.to_string()).collect();
        let location = if pages.is_empty() {
            String::new()
        } else {
            format!(" (page {})", pages.join(", "))
        };
        println!(
            "{} {}{}: found {}, expected {}",
            kind.as_str().unwrap_or("finding").yellow(),
            finding.section.bold(),
            location.dimmed(),
            finding.found,
            finding.expected,
        );
        if !finding.snippet.is_empty() {
            println!("    {}", finding.snippet.dimmed());
        }
        println!("    {} {}", "fix:".green(), finding.suggested_fix);
    }

    if !report.missing_sections.is_empty() {
        println!();
        println!("{}", "Missing sections".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for section in &report.missing_sections {
            println!("  {} {}", "✗".red(), section);
        }
    }

    println!();
    println!(
        "{} {} findings, {} missing sections",
        "Total:".bold(),
        report.findings.len(),
        report.missing_sections.len(),
    );

    Ok(())
}

fn cmd_highlight(template: &Path, manuscript: &Path, output: Option<&Path>) -> CliResult {
    let report = run_analysis(template, manuscript)?;
    let template_bytes = fs::read(template)?;
    let manuscript_bytes = fs::read(manuscript)?;
    let bytes = manucheck::highlight(&template_bytes, &manuscript_bytes, &report.findings)?;
    let path = write_output(manuscript, output, "_highlighted", &bytes)?;
    println!(
        "{} {} paragraphs flagged, saved to {}",
        "Done!".green().bold(),
        flagged_paragraphs(&report),
        path.display(),
    );
    Ok(())
}

fn cmd_correct(template: &Path, manuscript: &Path, output: Option<&Path>) -> CliResult {
    let report = run_analysis(template, manuscript)?;
    let template_bytes = fs::read(template)?;
    let manuscript_bytes = fs::read(manuscript)?;
    let bytes = manucheck::correct(&template_bytes, &manuscript_bytes, &report.findings)?;
    let path = write_output(manuscript, output, "_corrected", &bytes)?;
    println!(
        "{} {} findings applied, saved to {}",
        "Done!".green().bold(),
        report
            .findings
            .iter()
            .filter(|f| f.expected_value.is_actionable())
            .count(),
        path.display(),
    );
    Ok(())
}

fn cmd_insert(template: &Path, manuscript: &Path, output: Option<&Path>) -> CliResult {
    let report = run_analysis(template, manuscript)?;
    let missing = report.missing_labels();
    if missing.is_empty() {
        println!("{}", "No required sections are missing".green());
        return Ok(());
    }
    let template_bytes = fs::read(template)?;
    let manuscript_bytes = fs::read(manuscript)?;
    let bytes =
        manucheck::insert_missing_sections(&template_bytes, &manuscript_bytes, &missing)?;
    let path = write_output(manuscript, output, "_sections", &bytes)?;
    println!(
        "{} inserted {}, saved to {}",
        "Done!".green().bold(),
        label_list(&missing),
        path.display(),
    );
    Ok(())
}

fn cmd_fix(template: &Path, manuscript: &Path, output: Option<&Path>) -> CliResult {
    let template_bytes = fs::read(template)?;
    let manuscript_bytes = fs::read(manuscript)?;

    // Correct first, then insert missing sections, then highlight what was
    // touched so reviewers can see every change.
    let report = manucheck::analyze(&template_bytes, &manuscript_bytes);
    if report.is_parse_failure() {
        return Err("could not parse the documents".into());
    }

    let mut bytes = manucheck::correct(&template_bytes, &manuscript_bytes, &report.findings)?;
    bytes = manucheck::highlight(&template_bytes, &bytes, &report.findings)?;

    let missing = report.missing_labels();
    if !missing.is_empty() {
        bytes = manucheck::insert_missing_sections(&template_bytes, &bytes, &missing)?;
    }

    let path = write_output(manuscript, output, "_fixed", &bytes)?;
    println!(
        "{} {} findings corrected, {} sections inserted, saved to {}",
        "Done!".green().bold(),
        report.findings.len(),
        missing.len(),
        path.display(),
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "manucheck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Manuscript formatting compliance tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/manucheck/manucheck".dimmed()
    );
    println!("License: MIT");
}

fn write_output(
    manuscript: &Path,
    output: Option<&Path>,
    suffix: &str,
    bytes: &[u8],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = manuscript.file_stem().unwrap_or_default().to_string_lossy();
            manuscript.with_file_name(format!("{stem}{suffix}.docx"))
        }
    };
    fs::write(&path, bytes)?;
    Ok(path)
}

fn flagged_paragraphs(report: &AnalysisReport) -> usize {
    let mut indices: Vec<usize> = report
        .findings
        .iter()
        .flat_map(|f| f.paragraph_indices.iter().copied())
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices.len()
}

fn label_list(labels: &[SectionLabel]) -> String {
    labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_defaults_to_suffixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let manuscript = dir.path().join("paper.docx");
        fs::write(&manuscript, b"original").unwrap();

        let path = write_output(&manuscript, None, "_highlighted", b"mutated").unwrap();
        assert_eq!(path, dir.path().join("paper_highlighted.docx"));
        assert_eq!(fs::read(&path).unwrap(), b"mutated");
        // Input untouched
        assert_eq!(fs::read(&manuscript).unwrap(), b"original");
    }

    #[test]
    fn test_write_output_honors_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let manuscript = dir.path().join("paper.docx");
        let target = dir.path().join("reviewed.docx");
        fs::write(&manuscript, b"original").unwrap();

        let path = write_output(&manuscript, Some(target.as_path()), "_fixed", b"mutated").unwrap();
        assert_eq!(path, target);
        assert_eq!(fs::read(&target).unwrap(), b"mutated");
    }

    #[test]
    fn test_run_analysis_rejects_unreadable_documents() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.docx");
        let manuscript = dir.path().join("manuscript.docx");
        fs::write(&template, b"not a package").unwrap();
        fs::write(&manuscript, b"also not a package").unwrap();

        let err = run_analysis(&template, &manuscript).unwrap_err();
        assert!(err.to_string().contains("could not parse"));
    }

    #[test]
    fn test_run_analysis_requires_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere.docx");
        assert!(run_analysis(&missing, &missing).is_err());
    }
}
