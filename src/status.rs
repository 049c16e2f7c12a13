use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Completed { staff: Option<String> },
    Missed,
    #[serde(rename = "na")]
    NotApplicable,
    Missing,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Completed { .. } => "completed",
            TaskStatus::Missed => "missed",
            TaskStatus::NotApplicable => "na",
            TaskStatus::Missing => "missing",
        }
    }

    pub fn staff(&self) -> Option<&str> {
        match self {
            TaskStatus::Completed { staff } => staff.as_deref(),
            _ => None,
        }
    }
}

/// Classify a raw checklist cell.
///
/// Every input maps to a status: blanks are `Missing`, a `YES` prefix is
/// `Completed` with whatever follows as the staff name, a `NO` prefix is
/// `Missed`, `N/A`/`NA` is `NotApplicable`, and any other text is read as
/// a bare staff name on a completed task.
pub fn parse_task_status(raw: Option<&str>) -> TaskStatus {
    let value = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return TaskStatus::Missing,
    };

    if let Some(rest) = strip_prefix_ignore_case(value, "YES") {
        let rest = rest.trim_start();
        let rest = rest.strip_prefix('-').unwrap_or(rest).trim();
        let staff = (!rest.is_empty()).then(|| rest.to_string());
        return TaskStatus::Completed { staff };
    }

    if strip_prefix_ignore_case(value, "NO").is_some() {
        return TaskStatus::Missed;
    }

    if value.eq_ignore_ascii_case("N/A") || value.eq_ignore_ascii_case("NA") {
        return TaskStatus::NotApplicable;
    }

    TaskStatus::Completed {
        staff: Some(value.to_string()),
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}
