//! Output formatting for command results
//!
//! JSON and YAML render the serde form of each result; the human format is a
//! short report in the same layout for every command.

use crate::cache::CacheStats;
use crate::category::Category;
use crate::classify::ClassificationResult;
use crate::pipeline::{BuildResult, ResolvedBuild};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Alternatives shown in the human report
const MAX_ALTERNATIVES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn serialize<T: Serialize>(&self, value: &T, what: &str) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            OutputFormat::Human => Ok(None),
        }
    }

    pub fn format_classification<C: Category + Serialize>(
        &self,
        result: &ClassificationResult<C>,
    ) -> Result<String> {
        if let Some(out) = self.serialize(result, "classification")? {
            return Ok(out);
        }

        let mut out = String::new();
        if result.fallback {
            writeln!(out, "\u{26A0} Classification (below threshold)")?;
        } else {
            writeln!(out, "\u{2713} Classification")?;
        }
        writeln!(out, "{}\n", RULE)?;
        writeln!(out, "Project:    {}", result.root.display())?;
        writeln!(out, "Category:   {}", result.category)?;
        writeln!(out, "Confidence: {}\n", confidence_bar(result.confidence))?;

        let shown: Vec<_> = result
            .alternatives
            .iter()
            .take(MAX_ALTERNATIVES)
            .collect();
        if !shown.is_empty() {
            writeln!(out, "Scores:")?;
            for (i, scored) in shown.iter().enumerate() {
                let connector = if i + 1 == shown.len() { "\u{2514}" } else { "\u{251C}" };
                writeln!(
                    out,
                    "{}\u{2500} {:<14} {:.3}",
                    connector,
                    scored.category.id(),
                    scored.score
                )?;
            }
        }
        Ok(out)
    }

    pub fn format_resolved(&self, resolved: &ResolvedBuild) -> Result<String> {
        if let Some(out) = self.serialize(resolved, "resolved build")? {
            return Ok(out);
        }

        let config = &resolved.config;
        let mut out = String::new();
        writeln!(out, "\u{2713} Resolved Build Configuration")?;
        writeln!(out, "{}\n", RULE)?;
        let origin = if resolved.forced { "forced" } else { "detected" };
        writeln!(out, "Category:  {} ({})", resolved.category, origin)?;
        writeln!(out, "Strategy:  {}", resolved.strategy)?;
        writeln!(out, "Mode:      {}\n", config.mode)?;

        writeln!(out, "Output:")?;
        writeln!(out, "\u{251C}\u{2500} Input:     {}", config.input)?;
        writeln!(out, "\u{251C}\u{2500} Directory: {}", config.output.dir.display())?;
        let formats: Vec<String> = config.output.format.iter().map(|f| f.to_string()).collect();
        writeln!(out, "\u{251C}\u{2500} Formats:   {}", formats.join(", "))?;
        if config.external.is_empty() {
            writeln!(out, "\u{2514}\u{2500} External:  (none)")?;
        } else {
            writeln!(out, "\u{2514}\u{2500} External:  {}", config.external.join(", "))?;
        }

        writeln!(out, "\nPlugins: {}", config.plugin_names().join(", "))?;
        push_list(&mut out, "\u{26A0} Warnings", &resolved.warnings)?;
        Ok(out)
    }

    pub fn format_build(&self, result: &BuildResult) -> Result<String> {
        if let Some(out) = self.serialize(result, "build result")? {
            return Ok(out);
        }

        let mut out = String::new();
        if result.success {
            writeln!(out, "\u{2713} Build Succeeded")?;
        } else {
            writeln!(out, "\u{2717} Build Failed")?;
        }
        writeln!(out, "{}\n", RULE)?;
        writeln!(out, "Category:  {}", result.category)?;
        writeln!(out, "Engine:    {}", result.stats.engine)?;
        writeln!(
            out,
            "Cache:     {}",
            if result.cache_hit { "hit" } else { "miss" }
        )?;

        if !result.outputs.is_empty() {
            writeln!(out, "\nOutputs:")?;
            for (i, output) in result.outputs.iter().enumerate() {
                let connector = if i + 1 == result.outputs.len() { "\u{2514}" } else { "\u{251C}" };
                writeln!(out, "{}\u{2500} {}", connector, output)?;
            }
        }

        push_list(&mut out, "\u{26A0} Warnings", &result.warnings)?;
        push_list(&mut out, "\u{2717} Errors", &result.errors)?;
        writeln!(out, "\nFinished in {}ms", result.stats.duration_ms)?;
        Ok(out)
    }

    pub fn format_cache_stats(&self, stats: &CacheStats) -> Result<String> {
        if let Some(out) = self.serialize(stats, "cache stats")? {
            return Ok(out);
        }

        let mut out = String::new();
        writeln!(out, "Cache entries: {}", stats.entries)?;
        writeln!(out, "Total size:    {} bytes", stats.total_bytes)?;
        match stats.max_size {
            Some(max) => writeln!(out, "Budget:        {} bytes", max)?,
            None => writeln!(out, "Budget:        unbounded")?,
        }
        writeln!(out, "TTL:           {}s", stats.ttl_secs)?;
        Ok(out)
    }
}

fn confidence_bar(confidence: f64) -> String {
    let confidence = confidence.clamp(0.0, 1.0);
    let filled = (confidence * 10.0) as usize;
    format!(
        "{}{} {}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(10 - filled),
        (confidence * 100.0).round() as u8
    )
}

fn push_list(out: &mut String, title: &str, items: &[String]) -> std::fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}:", title)?;
    for item in items {
        writeln!(out, "  - {}", item)?;
    }
    Ok(())
}
