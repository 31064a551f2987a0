//! Probe report assembly and rendering

use super::outcome::{Outcome, ProbeResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Output format for a probe report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown report format '{other}' (expected table, json, or csv)")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        };
        f.write_str(s)
    }
}

/// One row of the report
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub test: String,
    pub status: String,
    pub details: String,
}

/// Aggregate counts over all probe results
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub allowed: usize,
    pub denied: usize,
    pub errors: usize,
    pub total: usize,
}

/// Full probe report, ordered by probe name for stable output
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub results: Vec<ReportEntry>,
    pub summary: Summary,
}

impl ProbeReport {
    pub fn from_results(results: &HashMap<String, ProbeResult>) -> Self {
        let mut entries: Vec<ReportEntry> = results
            .iter()
            .map(|(name, result)| ReportEntry {
                test: name.clone(),
                status: result.outcome.as_str().to_string(),
                details: result.detail.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.test.cmp(&b.test));

        let mut summary = Summary {
            allowed: 0,
            denied: 0,
            errors: 0,
            total: results.len(),
        };
        for result in results.values() {
            match result.outcome {
                Outcome::Allowed => summary.allowed += 1,
                Outcome::Forbidden => summary.denied += 1,
                _ => summary.errors += 1,
            }
        }

        Self {
            results: entries,
            summary,
        }
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Table => self.render_table(),
            ReportFormat::Json => self.render_json(),
            ReportFormat::Csv => self.render_csv(),
        }
    }

    fn render_table(&self) -> String {
        let test_width = self
            .results
            .iter()
            .map(|e| e.test.len())
            .chain(["TEST".len()].into_iter())
            .max()
            .unwrap_or(4);
        let status_width = self
            .results
            .iter()
            .map(|e| e.status.len())
            .chain(["STATUS".len()].into_iter())
            .max()
            .unwrap_or(6);

        let mut out = String::new();
        out.push_str(&format!(
            "{:test_width$}  {:status_width$}  DETAILS\n",
            "TEST", "STATUS"
        ));
        for entry in &self.results {
            out.push_str(&format!(
                "{:test_width$}  {:status_width$}  {}\n",
                entry.test, entry.status, entry.details
            ));
        }
        out.push_str(&format!(
            "\n{} allowed, {} denied, {} errors ({} total)\n",
            self.summary.allowed, self.summary.denied, self.summary.errors, self.summary.total
        ));
        out
    }

    fn render_json(&self) -> String {
        // Serialization of this shape cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    fn render_csv(&self) -> String {
        let mut out = String::from("test,status,details\n");
        for entry in &self.results {
            out.push_str(&format!(
                "{},{},{}\n",
                csv_field(&entry.test),
                csv_field(&entry.status),
                csv_field(&entry.details)
            ));
        }
        out
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> HashMap<String, ProbeResult> {
        let mut results = HashMap::new();
        results.insert(
            "list_workspaces".to_string(),
            ProbeResult::new(Outcome::Allowed, "3 items"),
        );
        results.insert(
            "create_workspace".to_string(),
            ProbeResult::new(Outcome::Forbidden, "Insufficient privileges"),
        );
        results.insert(
            "admin_list_workspaces".to_string(),
            ProbeResult::new(Outcome::Unauthorized, ""),
        );
        results.insert(
            "list_capacities".to_string(),
            ProbeResult::new(Outcome::Error, "HTTP 500"),
        );
        results
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let report = ProbeReport::from_results(&sample_results());
        let names: Vec<&str> = report.results.iter().map(|e| e.test.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "admin_list_workspaces",
                "create_workspace",
                "list_capacities",
                "list_workspaces"
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let report = ProbeReport::from_results(&sample_results());
        assert_eq!(
            report.summary,
            Summary {
                allowed: 1,
                denied: 1,
                errors: 2,
                total: 4
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let report = ProbeReport::from_results(&sample_results());
        let parsed: serde_json::Value = serde_json::from_str(&report.render(ReportFormat::Json)).unwrap();
        assert_eq!(parsed["summary"]["allowed"], 1);
        assert_eq!(parsed["summary"]["total"], 4);
        assert_eq!(parsed["results"][0]["test"], "admin_list_workspaces");
        assert_eq!(parsed["results"][0]["status"], "UNAUTHORIZED");
        assert!(parsed["results"][0]["details"].is_string());
    }

    #[test]
    fn test_table_contains_rows_and_summary_line() {
        let report = ProbeReport::from_results(&sample_results());
        let table = report.render(ReportFormat::Table);
        assert!(table.contains("TEST"));
        assert!(table.contains("list_workspaces"));
        assert!(table.contains("FORBIDDEN"));
        assert!(table.contains("1 allowed, 1 denied, 2 errors (4 total)"));
    }

    #[test]
    fn test_csv_escapes_delimiters_and_quotes() {
        let mut results = HashMap::new();
        results.insert(
            "probe_a".to_string(),
            ProbeResult::new(Outcome::Error, "bad, \"quoted\" thing"),
        );
        let report = ProbeReport::from_results(&results);
        let csv = report.render(ReportFormat::Csv);
        assert!(csv.starts_with("test,status,details\n"));
        assert!(csv.contains("probe_a,ERROR,\"bad, \"\"quoted\"\" thing\""));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("table".parse::<ReportFormat>().unwrap(), ReportFormat::Table);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }
}
