use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{ShiftType, Submission};
use crate::taxonomy::{
    LEADER_FIRST_NAME, LEADER_LAST_NAME, NARRATIVE, REVIEWED_PRIOR, SHIFT, SUBMISSION_DATE,
};

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

#[derive(Debug, Clone)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn google_sheet(sheet_id: &str) -> Self {
        DataSource::Url(format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            sheet_id.trim()
        ))
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }

    /// Fetch the sheet and return its submissions, newest first.
    pub async fn load(&self) -> anyhow::Result<Vec<Submission>> {
        tracing::info!(source = %self.describe(), "loading checklist submissions");
        let submissions = match self {
            DataSource::File(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                parse_submissions(file)?
            }
            DataSource::Url(url) => {
                let body = fetch_csv(url).await?;
                parse_submissions(body.as_bytes())?
            }
        };
        tracing::info!(count = submissions.len(), "loaded submissions");
        Ok(submissions)
    }
}

async fn fetch_csv(url: &str) -> anyhow::Result<String> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to reach {url}"))?
        .error_for_status()
        .with_context(|| {
            format!("{url} rejected the request; is the sheet shared as 'Anyone with the link'?")
        })?;
    response
        .text()
        .await
        .context("failed to read CSV response body")
}

/// Parse a checklist export. Rows whose timestamp cannot be read are
/// skipped; the rest are returned sorted newest first.
pub fn parse_submissions<R: Read>(reader: R) -> anyhow::Result<Vec<Submission>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("failed to read CSV header row")?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    if !headers.iter().any(|header| header == SUBMISSION_DATE) {
        anyhow::bail!("CSV has no {SUBMISSION_DATE:?} column");
    }

    let mut submissions = Vec::new();
    for result in reader.records() {
        let record = result.context("malformed CSV record")?;
        let line = record_line(&record);
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let raw_timestamp = fields.get(SUBMISSION_DATE).map(String::as_str).unwrap_or("");
        let Some(submitted_at) = parse_timestamp(raw_timestamp) else {
            tracing::warn!(line, value = raw_timestamp, "skipping row with unreadable timestamp");
            continue;
        };
        tracing::debug!(line, %submitted_at, "parsed submission");

        submissions.push(Submission {
            submitted_at,
            shift: ShiftType::parse(text(&fields, SHIFT).unwrap_or("")),
            leader_first: text(&fields, LEADER_FIRST_NAME).unwrap_or("").to_string(),
            leader_last: text(&fields, LEADER_LAST_NAME).unwrap_or("").to_string(),
            narrative: text(&fields, NARRATIVE).map(str::to_string),
            reviewed_prior: text(&fields, REVIEWED_PRIOR).map(str::to_string),
            fields,
        });
    }

    sort_newest_first(&mut submissions);
    Ok(submissions)
}

/// File line where `record` starts; quoted cells may span several lines.
fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or_default()
}

fn text<'a>(fields: &'a HashMap<String, String>, column: &str) -> Option<&'a str> {
    fields
        .get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn sort_newest_first(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TaskStatus;

    const SAMPLE: &str = "\
Submission Date,Shift,Shift Leader Name - First Name,Shift Leader Name - Last Name,Meds Given,Prepare Breakfast,Did You Review the Last Shift Checklist at the Beginning of your Shift?,Narrative to Include Shift Issues/Comments and Info for Next Shift
2026-02-01 07:45:00,AM,Avery,Lee,YES - Avery,NO,YES,
2026-02-02 15:10:00,pm,Jules,Moreno,,N/A,NO,\"Fridge door sticks.
Call maintenance.\"
not a date,AM,Kiara,Patel,YES,YES,YES,
";

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    #[test]
    fn parses_rows_newest_first_and_skips_bad_timestamps() {
        let submissions = parse_submissions(SAMPLE.as_bytes()).unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].submitted_at, at(2, 15, 10));
        assert_eq!(submissions[0].shift, ShiftType::Pm);
        assert_eq!(submissions[0].leader_name(), "Jules Moreno");
        assert_eq!(
            submissions[0].narrative.as_deref(),
            Some("Fridge door sticks.\nCall maintenance.")
        );
        assert_eq!(submissions[1].reviewed_prior.as_deref(), Some("YES"));
        assert_eq!(submissions[1].narrative, None);
    }

    #[test]
    fn empty_cells_are_missing_and_absent_columns_are_none() {
        let submissions = parse_submissions(SAMPLE.as_bytes()).unwrap();
        let latest = &submissions[0];
        assert_eq!(latest.status("Meds Given"), Some(TaskStatus::Missing));
        assert_eq!(latest.status("Prepare Breakfast"), Some(TaskStatus::NotApplicable));
        assert_eq!(latest.status("Clean Kitchen"), None);
    }

    #[test]
    fn record_lines_account_for_multiline_cells() {
        let mut reader = csv::Reader::from_reader(SAMPLE.as_bytes());
        let lines: Vec<u64> = reader
            .records()
            .map(|record| record_line(&record.unwrap()))
            .collect();
        assert_eq!(lines, vec![2, 3, 5]);
    }

    #[test]
    fn requires_submission_date_column() {
        let csv = "Shift,Meds Given\nAM,YES\n";
        assert!(parse_submissions(csv.as_bytes()).is_err());
    }

    #[test]
    fn reads_common_timestamp_formats() {
        let expected = at(3, 14, 5);
        for raw in [
            "2026-02-03 14:05:00",
            "2026-02-03T14:05:00",
            "02/03/2026 14:05",
            "02/03/2026 2:05 PM",
            "Feb 03, 2026 02:05 PM",
            "2026-02-03T14:05:00-05:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_timestamp("2026-02-03"), Some(at(3, 0, 0)));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("soon"), None);
    }

    #[test]
    fn sheet_id_builds_export_url() {
        let source = DataSource::google_sheet(" abc123 ");
        assert_eq!(
            source.describe(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }
}
