//! Output formatters for match results, rankings and comparisons

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{MatcherError, Result};
use crate::output::report::{Report, ReportContent, ScoreBand};
use crate::processing::comparison::StrategyComparison;
use crate::processing::matcher::MatchResult;
use crate::processing::ranking::RankingOutcome;
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors.
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let band = ScoreBand::from_score(score);
        let color = match band {
            ScoreBand::Excellent => Color::Green,
            ScoreBand::Good => Color::Yellow,
            ScoreBand::Fair => Color::BrightYellow,
            ScoreBand::Poor => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", band.label().color(color).bold())
        } else {
            format!("[{}]", band.label())
        }
    }

    fn format_match(&self, out: &mut String, result: &MatchResult) -> std::fmt::Result {
        let heading = match &result.applicant {
            Some(applicant) => format!("{} -> {} ({})", applicant, result.job_title, result.job_id),
            None => format!("{} at {} ({})", result.job_title, result.company_name, result.job_id),
        };
        writeln!(
            out,
            "{} {:.2}% {}",
            self.colorize(&heading, Color::Cyan),
            result.overall_match_percentage,
            self.format_score_badge(result.overall_match_percentage)
        )?;

        if self.detailed {
            writeln!(out, "    Experience:     {:>6.2}%", result.experience_score)?;
            writeln!(out, "    Skills:         {:>6.2}%", result.skills_score)?;
            writeln!(out, "    Profession:     {:>6.2}%", result.profession_score)?;
            writeln!(out, "    Summary:        {:>6.2}%", result.summary_score)?;
            if let Some(qualifications) = result.qualifications_score {
                writeln!(out, "    Qualifications: {:>6.2}%", qualifications)?;
            }
        }
        Ok(())
    }

    fn format_outcome(&self, out: &mut String, outcome: &RankingOutcome) -> std::fmt::Result {
        if outcome.matches.is_empty() {
            writeln!(out, "No matches.")?;
        }
        for (rank, result) in outcome.matches.iter().enumerate() {
            write!(out, "{:>3}. ", rank + 1)?;
            self.format_match(out, result)?;
        }

        if !outcome.failures.is_empty() {
            out.push_str(&self.format_header("Skipped", 3));
            for failure in &outcome.failures {
                writeln!(
                    out,
                    "  • #{} {}: {}",
                    failure.index,
                    failure.record_id,
                    self.colorize(&failure.message, Color::Red)
                )?;
            }
        }
        Ok(())
    }

    fn format_comparison(&self, out: &mut String, primary: &str, secondary: &str, rows: &[StrategyComparison]) -> std::fmt::Result {
        writeln!(out, "{:<12} {:<30} {:>10} {:>10} {:>10}", "Job", "Title", primary, secondary, "Diff")?;
        for row in rows {
            let diff = format!("{:+.2}", row.difference);
            let diff = if row.difference >= 0.0 {
                self.colorize(&diff, Color::Green)
            } else {
                self.colorize(&diff, Color::Red)
            };
            writeln!(
                out,
                "{:<12} {:<30} {:>10.2} {:>10.2} {:>10}",
                row.job_id, row.job_title, row.primary, row.secondary, diff
            )?;
        }
        Ok(())
    }

    fn render(&self, report: &Report) -> std::result::Result<String, std::fmt::Error> {
        let mut out = String::new();
        let metadata = &report.metadata;

        out.push_str(&self.format_header(report.title(), 1));
        writeln!(
            out,
            "Generated: {} | Strategy: {} | Scheme: {} | Processing time: {}ms",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.strategy,
            metadata.scheme,
            metadata.processing_time_ms
        )?;
        if (metadata.weight_sum - 1.0).abs() > 1e-9 {
            writeln!(
                out,
                "{}",
                self.colorize(
                    &format!("Weights sum to {:.2}; scores are not on a 0-100 scale", metadata.weight_sum),
                    Color::Yellow
                )
            )?;
        }

        match &report.content {
            ReportContent::Match { result } => {
                out.push_str(&self.format_header("Result", 2));
                self.format_match(&mut out, result)?;
            }
            ReportContent::JobRanking { resume_id, outcome } => {
                out.push_str(&self.format_header(&format!("Resume {}", resume_id), 2));
                self.format_outcome(&mut out, outcome)?;
            }
            ReportContent::ResumeRanking { job_id, job_title, outcome } => {
                out.push_str(&self.format_header(&format!("{} ({})", job_title, job_id), 2));
                self.format_outcome(&mut out, outcome)?;
            }
            ReportContent::Comparison { primary, secondary, rows } => {
                out.push_str(&self.format_header("Overall by strategy", 2));
                self.format_comparison(&mut out, primary, secondary, rows)?;
            }
        }
        Ok(out)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        self.render(report)
            .map_err(|e| MatcherError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn match_table(out: &mut String, matches: &[MatchResult]) -> std::fmt::Result {
        let with_applicant = matches.iter().any(|m| m.applicant.is_some());
        let with_qualifications = matches.iter().any(|m| m.qualifications_score.is_some());

        out.push_str("| # |");
        if with_applicant {
            out.push_str(" Applicant |");
        }
        out.push_str(" Job | Company | Experience | Skills | Profession | Summary |");
        if with_qualifications {
            out.push_str(" Qualifications |");
        }
        out.push_str(" Overall |\n|---|");
        if with_applicant {
            out.push_str("---|");
        }
        out.push_str("---|---|---|---|---|---|");
        if with_qualifications {
            out.push_str("---|");
        }
        out.push_str("---|\n");

        for (rank, m) in matches.iter().enumerate() {
            write!(out, "| {} |", rank + 1)?;
            if with_applicant {
                write!(out, " {} |", m.applicant.as_deref().unwrap_or(""))?;
            }
            write!(
                out,
                " {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
                m.job_title, m.company_name, m.experience_score, m.skills_score, m.profession_score, m.summary_score
            )?;
            if with_qualifications {
                write!(out, " {:.2} |", m.qualifications_score.unwrap_or(0.0))?;
            }
            writeln!(out, " **{:.2}** |", m.overall_match_percentage)?;
        }
        Ok(())
    }

    fn render(&self, report: &Report) -> std::result::Result<String, std::fmt::Error> {
        let mut out = String::new();
        let metadata = &report.metadata;

        writeln!(out, "# {}\n", report.title())?;
        if self.include_metadata {
            writeln!(
                out,
                "**Generated:** {} | **Strategy:** {} | **Scheme:** {} | **Weight sum:** {:.2}\n",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                metadata.strategy,
                metadata.scheme,
                metadata.weight_sum
            )?;
        }

        match &report.content {
            ReportContent::Match { result } => {
                Self::match_table(&mut out, std::slice::from_ref(result))?;
            }
            ReportContent::JobRanking { resume_id, outcome } => {
                writeln!(out, "Resume `{}`\n", resume_id)?;
                Self::match_table(&mut out, &outcome.matches)?;
                Self::failures(&mut out, outcome)?;
            }
            ReportContent::ResumeRanking { job_id, job_title, outcome } => {
                writeln!(out, "Job **{}** (`{}`)\n", job_title, job_id)?;
                Self::match_table(&mut out, &outcome.matches)?;
                Self::failures(&mut out, outcome)?;
            }
            ReportContent::Comparison { primary, secondary, rows } => {
                writeln!(out, "| Job | Title | {} | {} | Difference |", primary, secondary)?;
                writeln!(out, "|---|---|---|---|---|")?;
                for row in rows {
                    writeln!(
                        out,
                        "| {} | {} | {:.2} | {:.2} | {:+.2} |",
                        row.job_id, row.job_title, row.primary, row.secondary, row.difference
                    )?;
                }
            }
        }
        Ok(out)
    }

    fn failures(out: &mut String, outcome: &RankingOutcome) -> std::fmt::Result {
        if outcome.failures.is_empty() {
            return Ok(());
        }
        writeln!(out, "\n## Skipped\n")?;
        for failure in &outcome.failures {
            writeln!(out, "- #{} `{}`: {}", failure.index, failure.record_id, failure.message)?;
        }
        Ok(())
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        self.render(report)
            .map_err(|e| MatcherError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Picks the formatter for the configured output format.
pub fn formatter_for(format: OutputFormat, options: &OutputConfig) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(options.color_output, options.detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(true)),
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
