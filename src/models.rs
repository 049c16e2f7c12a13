use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::status::{parse_task_status, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShiftType {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
    Overnight,
    Unknown,
}

impl ShiftType {
    pub const KNOWN: [ShiftType; 3] = [ShiftType::Am, ShiftType::Pm, ShiftType::Overnight];

    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("AM") {
            ShiftType::Am
        } else if value.eq_ignore_ascii_case("PM") {
            ShiftType::Pm
        } else if value.eq_ignore_ascii_case("Overnight") {
            ShiftType::Overnight
        } else {
            ShiftType::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftType::Am => "AM",
            ShiftType::Pm => "PM",
            ShiftType::Overnight => "Overnight",
            ShiftType::Unknown => "Unknown",
        }
    }
}

/// One shift checklist as submitted through the form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub submitted_at: NaiveDateTime,
    pub shift: ShiftType,
    pub leader_first: String,
    pub leader_last: String,
    /// Raw cell values keyed by column label. Columns missing from the
    /// sheet are absent; empty cells are present with an empty string.
    pub fields: HashMap<String, String>,
    pub narrative: Option<String>,
    pub reviewed_prior: Option<String>,
}

impl Submission {
    pub fn leader_name(&self) -> String {
        format!("{} {}", self.leader_first.trim(), self.leader_last.trim())
            .trim()
            .to_string()
    }

    pub fn value(&self, task: &str) -> Option<&str> {
        self.fields.get(task).map(String::as_str)
    }

    /// Status of `task`, or `None` when the column is absent from this row.
    pub fn status(&self, task: &str) -> Option<TaskStatus> {
        self.fields
            .get(task)
            .map(|value| parse_task_status(Some(value)))
    }

    pub fn date(&self) -> NaiveDate {
        self.submitted_at.date()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub missed: usize,
    pub na: usize,
    pub missing: usize,
    pub rate: f64,
}

impl CompletionStats {
    pub fn record(&mut self, status: &TaskStatus) {
        match status {
            TaskStatus::Completed { .. } => self.completed += 1,
            TaskStatus::Missed => self.missed += 1,
            TaskStatus::NotApplicable => self.na += 1,
            TaskStatus::Missing => self.missing += 1,
        }
        self.rate = self.compute_rate();
    }

    pub fn merge(&mut self, other: &CompletionStats) {
        self.completed += other.completed;
        self.missed += other.missed;
        self.na += other.na;
        self.missing += other.missing;
        self.rate = self.compute_rate();
    }

    /// Tasks that count toward the rate; `na` is excluded.
    pub fn applicable(&self) -> usize {
        self.completed + self.missed + self.missing
    }

    pub fn total(&self) -> usize {
        self.applicable() + self.na
    }

    fn compute_rate(&self) -> f64 {
        let applicable = self.applicable();
        if applicable == 0 {
            0.0
        } else {
            self.completed as f64 / applicable as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub section: String,
    pub stats: CompletionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftTypeSummary {
    pub shift: ShiftType,
    pub submissions: usize,
    pub avg_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub submissions: usize,
    pub avg_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSubmission {
    pub submitted_at: NaiveDateTime,
    pub leader: String,
    pub shift: ShiftType,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_submissions: usize,
    pub today_submissions: usize,
    pub window_days: i64,
    pub window_submissions: usize,
    pub window_avg_rate: f64,
    pub overall_avg_rate: f64,
    pub sections: Vec<SectionSummary>,
    pub shifts: Vec<ShiftTypeSummary>,
    pub daily: Vec<DailySummary>,
    pub recent: Vec<RecentSubmission>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedTask {
    pub task: String,
    pub missed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffCount {
    pub staff: String,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffCompliance {
    pub reviewed: usize,
    pub not_reviewed: usize,
    pub total: usize,
    /// `None` when no shift answered YES or NO.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub submissions: usize,
    pub most_missed: Vec<MissedTask>,
    pub top_staff: Vec<StaffCount>,
    pub compliance: HandoffCompliance,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrendOutcome {
    Insufficient { submissions: usize },
    Ready(TrendReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct HandoffTask {
    pub task: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandoffSection {
    pub title: String,
    pub stats: CompletionStats,
    pub tasks: Vec<HandoffTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentCheck {
    pub label: String,
    /// Checked options, one per line in the sheet.
    pub checked: Vec<String>,
    pub staff: Option<String>,
}

/// What the incoming shift needs to know about the last submitted one.
#[derive(Debug, Clone, Serialize)]
pub struct Handoff {
    pub submitted_at: NaiveDateTime,
    pub shift: ShiftType,
    pub leader: String,
    pub reviewed_prior: Option<String>,
    pub sections: Vec<HandoffSection>,
    pub equipment: Vec<EquipmentCheck>,
    pub narrative: Option<String>,
}
