//! Console and JSON rendering of command results

use crate::analysis::{CvAnalysisReport, DashboardStats};
use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::extraction::ScanSummary;
use crate::storage::JobMatch;
use colored::{Color, Colorize};
use serde::Serialize;

/// Everything a command can print.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Import {
        records_read: usize,
        jobs_stored: usize,
    },
    Scan(&'a ScanSummary),
    Matches(&'a [JobMatch]),
    Detection {
        profile: &'a str,
        scores: &'a [(String, usize)],
    },
    Analysis(&'a CvAnalysisReport),
    Dashboard(&'a DashboardStats),
}

pub trait OutputFormatter {
    fn format_report(&self, report: &Report<'_>) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
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

    fn format_match_badge(&self, percentage: i64) -> String {
        let (badge, color) = match percentage {
            90..=i64::MAX => ("EXCELLENT", Color::Green),
            75..=89 => ("STRONG", Color::BrightGreen),
            60..=74 => ("GOOD", Color::Yellow),
            _ => ("PARTIAL", Color::BrightYellow),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_import(&self, records_read: usize, jobs_stored: usize) -> String {
        let mut output = self.format_header("📥 JOB IMPORT", 1);
        output.push_str(&format!("Records read: {}\n", records_read));
        output.push_str(&format!("Jobs stored:  {}\n", jobs_stored));
        output
    }

    fn format_scan(&self, summary: &ScanSummary) -> String {
        let mut output = self.format_header("🔍 SKILL EXTRACTION", 1);
        output.push_str(&format!("Documents:  {}\n", summary.total_documents));
        output.push_str(&format!("Processed:  {}\n", summary.processed));
        if summary.failed > 0 {
            output.push_str(&format!(
                "Failed:     {}\n",
                self.colorize(&summary.failed.to_string(), Color::Red)
            ));
        }
        output.push_str(&format!("Links:      {}\n", summary.links_saved));
        output.push_str(&format!("Duration:   {:.2}s\n", summary.elapsed.as_secs_f64()));

        let status = if summary.saved {
            self.colorize("saved", Color::Green)
        } else {
            self.colorize("nothing saved", Color::Yellow)
        };
        output.push_str(&format!("Status:     {}\n", status));
        output
    }

    fn format_matches(&self, matches: &[JobMatch]) -> String {
        let mut output = self.format_header("🎯 MATCHING JOBS", 1);
        if matches.is_empty() {
            output.push_str("No jobs above the match threshold.\n");
            return output;
        }

        for (index, job) in matches.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. {} {}% {}\n",
                index + 1,
                self.colorize(job.title.as_deref().unwrap_or("(untitled)"), Color::Cyan),
                job.match_percentage,
                self.format_match_badge(job.match_percentage)
            ));

            match &job.company {
                Some(company) => output.push_str(&format!("    {} | {}\n", company, job.level)),
                None => output.push_str(&format!("    {}\n", job.level)),
            }
            if let Some(link) = &job.link {
                output.push_str(&format!("    {}\n", self.colorize(link, Color::BrightBlack)));
            }
        }
        output
    }

    fn format_detection(&self, profile: &str, scores: &[(String, usize)]) -> String {
        let mut output = self.format_header("🧭 PROFILE DETECTION", 1);
        output.push_str(&format!("Detected profile: {}\n", self.colorize(profile, Color::Cyan)));

        let mut ranked: Vec<&(String, usize)> = scores.iter().filter(|(_, score)| *score > 0).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        if !ranked.is_empty() {
            output.push_str(&self.format_header("Scores", 3));
            for (name, score) in ranked {
                output.push_str(&format!("  {:<32} {}\n", name, score));
            }
        }
        output
    }

    fn format_analysis(&self, report: &CvAnalysisReport) -> String {
        let details = &report.analysis_details;
        let recommendation = &report.recommendation;

        let mut output = self.format_header("📊 CV MARKET ANALYSIS", 1);
        output.push_str(&format!("Profile: {}\n", self.colorize(&details.profile, Color::Cyan)));
        output.push_str(&format!("Heuristic profile: {}\n", details.heuristic_profile));
        output.push_str(&format!("Experience level: {}\n", details.level));

        if !details.cv_skills.is_empty() {
            output.push_str(&self.format_header("Skills found in CV", 2));
            output.push_str(&format!("{}\n", details.cv_skills.join(", ")));
        }

        if !details.market_gaps.is_empty() {
            output.push_str(&self.format_header("Market gaps", 2));
            for gap in &details.market_gaps {
                output.push_str(&format!("  • {}\n", self.colorize(gap, Color::Yellow)));
            }
        }

        output.push_str(&self.format_header("Recommendation", 2));
        for paragraph in [&recommendation.opening, &recommendation.gap_analysis_intro] {
            if !paragraph.is_empty() {
                output.push_str(&format!("{}\n\n", paragraph));
            }
        }
        if !recommendation.cv_review_title.is_empty() {
            output.push_str(&self.format_header(&recommendation.cv_review_title, 3));
        }
        for point in &recommendation.cv_review_points {
            output.push_str(&format!("  💡 {}\n", point));
        }
        if !recommendation.closing.is_empty() {
            output.push_str(&format!("\n{}\n", recommendation.closing));
        }

        if !report.top_jobs.is_empty() {
            output.push_str(&self.format_matches(&report.top_jobs));
        }
        output
    }

    fn format_dashboard(&self, stats: &DashboardStats) -> String {
        let mut output = self.format_header("📈 JOB MARKET DASHBOARD", 1);
        output.push_str(&format!("Jobs with a known level: {}\n", stats.total_jobs));

        output.push_str(&self.format_header("Most requested skills", 2));
        for share in &stats.skills {
            output.push_str(&format!(
                "  {:<24} {:>5} jobs  {:>6.2}%\n",
                share.skill, share.job_count, share.percentage
            ));
        }

        output.push_str(&self.format_header("Experience levels", 2));
        for level in &stats.levels {
            output.push_str(&format!("  {:<24} {:>5}\n", level.name, level.count));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report<'_>) -> Result<String> {
        Ok(match report {
            Report::Import {
                records_read,
                jobs_stored,
            } => self.format_import(*records_read, *jobs_stored),
            Report::Scan(summary) => self.format_scan(summary),
            Report::Matches(matches) => self.format_matches(matches),
            Report::Detection { profile, scores } => self.format_detection(profile, scores),
            Report::Analysis(analysis) => self.format_analysis(analysis),
            Report::Dashboard(stats) => self.format_dashboard(stats),
        })
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
    fn format_report(&self, report: &Report<'_>) -> Result<String> {
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

impl ReportGenerator {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(config.color_output),
            json_formatter: JsonFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &Report<'_>, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
        }
    }
}
