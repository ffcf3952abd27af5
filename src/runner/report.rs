//! Renders accumulated results into the categorized report files.

use super::progress::TaggedResult;
use crate::core::error::Result;
use crate::core::models::ValidationStatus;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// Writes per-status text files, a combined CSV, per-source variants of
/// both, and a per-country tally of valid results under the output
/// directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

const CSV_HEADER: &str =
    "identifier,source,status,country,score,spam_risk,auth_result,mx_primary,details";

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn write_all(&self, results: &[TaggedResult]) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        self.write_status_file("valid.txt", results, ValidationStatus::Valid)?;
        self.write_status_file("invalid.txt", results, ValidationStatus::Invalid)?;
        self.write_status_file("skipped.txt", results, ValidationStatus::Skipped)?;
        self.write_csv("summary.csv", results)?;
        self.write_per_source_reports(results)?;
        self.write_country_tally(results)?;

        info!(
            target: "report",
            "Wrote reports for {} result(s) to {}",
            results.len(),
            self.output_dir.display()
        );
        Ok(())
    }

    /// One line per record: `identifier:secret:country:STATUS`.
    fn write_status_file(
        &self,
        name: &str,
        results: &[TaggedResult],
        status: ValidationStatus,
    ) -> Result<()> {
        let mut out = String::new();
        for tagged in results.iter().filter(|t| t.result.status == status) {
            let r = &tagged.result;
            let _ = writeln!(
                out,
                "{}:{}:{}:{}",
                r.identifier,
                r.secret,
                r.country,
                r.status.as_str()
            );
        }
        std::fs::write(self.output_dir.join(name), out)?;
        Ok(())
    }

    fn write_csv(&self, name: &str, results: &[TaggedResult]) -> Result<()> {
        std::fs::write(self.output_dir.join(name), render_csv(results))?;
        Ok(())
    }

    /// Per input file: a full CSV and a valid-only list.
    fn write_per_source_reports(&self, results: &[TaggedResult]) -> Result<()> {
        let mut by_source: BTreeMap<&str, Vec<TaggedResult>> = BTreeMap::new();
        for tagged in results {
            by_source
                .entry(tagged.source_tag.as_str())
                .or_default()
                .push(tagged.clone());
        }
        for (source, group) in by_source {
            self.write_csv(&format!("{}_summary.csv", source), &group)?;
            self.write_status_file(
                &format!("{}_valid.txt", source),
                &group,
                ValidationStatus::Valid,
            )?;
        }
        Ok(())
    }

    /// Count of valid results per country, descending, then by name.
    fn write_country_tally(&self, results: &[TaggedResult]) -> Result<()> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tagged in results
            .iter()
            .filter(|t| t.result.status == ValidationStatus::Valid)
        {
            *counts.entry(tagged.result.country.as_str()).or_default() += 1;
        }
        let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut out = String::new();
        for (country, count) in entries {
            let _ = writeln!(out, "{}: {}", country, count);
        }
        std::fs::write(self.output_dir.join("countries.txt"), out)?;
        Ok(())
    }
}

fn render_csv(results: &[TaggedResult]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for tagged in results {
        let r = &tagged.result;
        let row = [
            r.identifier.clone(),
            tagged.source_tag.clone(),
            r.status.as_str().to_string(),
            r.country.clone(),
            r.score.to_string(),
            r.spam_risk.as_str().to_string(),
            r.auth_result.as_str().to_string(),
            r.mx_primary.clone().unwrap_or_default(),
            r.details.join("; "),
        ];
        let rendered: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
        out.push_str(&rendered.join(","));
        out.push('\n');
    }
    out
}

/// Quotes a field when it contains a delimiter, quote or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
