use std::collections::HashMap;

use crate::models::{HandoffCompliance, MissedTask, StaffCount, Submission, TrendOutcome, TrendReport};
use crate::status::TaskStatus;
use crate::taxonomy::TaskTaxonomy;

pub const DEFAULT_LIMIT: usize = 10;

/// Names that show up when a cell like "YES - YES" is parsed; not staff.
const DEGENERATE_STAFF: [&str; 3] = ["YES", "NO", "N/A"];

/// Tasks ranked by how many submissions marked them missed. Ties keep
/// task-list order; tasks never missed are left out.
pub fn most_missed_tasks<S: AsRef<str>>(
    submissions: &[Submission],
    tasks: &[S],
    limit: usize,
) -> Vec<MissedTask> {
    let mut ranked: Vec<MissedTask> = tasks
        .iter()
        .map(|task| {
            let task = task.as_ref();
            let missed = submissions
                .iter()
                .filter(|submission| submission.status(task) == Some(TaskStatus::Missed))
                .count();
            MissedTask {
                task: task.to_string(),
                missed,
            }
        })
        .filter(|entry| entry.missed > 0)
        .collect();

    ranked.sort_by(|a, b| b.missed.cmp(&a.missed));
    ranked.truncate(limit);
    ranked
}

/// Staff ranked by completed-task attributions. Names are visited task by
/// task, then submission by submission; ties keep first-seen order.
pub fn top_staff<S: AsRef<str>>(
    submissions: &[Submission],
    tasks: &[S],
    limit: usize,
) -> Vec<StaffCount> {
    let mut ranked: Vec<StaffCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for task in tasks {
        for submission in submissions {
            let Some(TaskStatus::Completed { staff: Some(staff) }) = submission.status(task.as_ref())
            else {
                continue;
            };
            let name = staff.trim();
            if name.is_empty() || is_degenerate(name) {
                continue;
            }

            match index.get(name) {
                Some(&position) => ranked[position].completed += 1,
                None => {
                    index.insert(name.to_string(), ranked.len());
                    ranked.push(StaffCount {
                        staff: name.to_string(),
                        completed: 1,
                    });
                }
            }
        }
    }

    ranked.sort_by(|a, b| b.completed.cmp(&a.completed));
    ranked.truncate(limit);
    ranked
}

fn is_degenerate(name: &str) -> bool {
    DEGENERATE_STAFF
        .iter()
        .any(|token| name.eq_ignore_ascii_case(token))
}

pub fn handoff_compliance(submissions: &[Submission]) -> HandoffCompliance {
    let mut reviewed = 0usize;
    let mut not_reviewed = 0usize;

    for answer in submissions
        .iter()
        .filter_map(|submission| submission.reviewed_prior.as_deref())
    {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("YES") {
            reviewed += 1;
        } else if answer.eq_ignore_ascii_case("NO") {
            not_reviewed += 1;
        }
    }

    let total = reviewed + not_reviewed;
    HandoffCompliance {
        reviewed,
        not_reviewed,
        total,
        rate: (total > 0).then(|| reviewed as f64 / total as f64 * 100.0),
    }
}

pub fn analyze(submissions: &[Submission], taxonomy: &TaskTaxonomy, limit: usize) -> TrendOutcome {
    if submissions.len() < 2 {
        return TrendOutcome::Insufficient {
            submissions: submissions.len(),
        };
    }

    let tasks = taxonomy.all_tasks();
    TrendOutcome::Ready(TrendReport {
        submissions: submissions.len(),
        most_missed: most_missed_tasks(submissions, &tasks, limit),
        top_staff: top_staff(submissions, &tasks, limit),
        compliance: handoff_compliance(submissions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use chrono::NaiveDate;

    fn sample_submission(cells: &[(&str, &str)], reviewed_prior: Option<&str>) -> Submission {
        Submission {
            submitted_at: NaiveDate::from_ymd_opt(2026, 2, 2)
                .and_then(|date| date.and_hms_opt(7, 30, 0))
                .unwrap(),
            shift: ShiftType::Am,
            leader_first: "Jules".to_string(),
            leader_last: "Moreno".to_string(),
            fields: cells
                .iter()
                .map(|(task, value)| (task.to_string(), value.to_string()))
                .collect(),
            narrative: None,
            reviewed_prior: reviewed_prior.map(str::to_string),
        }
    }

    #[test]
    fn most_missed_ranks_by_count() {
        let rows = vec![
            sample_submission(&[("A", "NO"), ("B", "NO")], None),
            sample_submission(&[("A", "NO"), ("B", "YES")], None),
            sample_submission(&[("A", "NO"), ("B", "YES")], None),
            sample_submission(&[("A", "YES"), ("B", "")], None),
            sample_submission(&[("A", "N/A"), ("B", "YES")], None),
        ];
        let ranked = most_missed_tasks(&rows, &["B", "A", "C"], DEFAULT_LIMIT);
        assert_eq!(
            ranked,
            vec![
                MissedTask { task: "A".to_string(), missed: 3 },
                MissedTask { task: "B".to_string(), missed: 1 },
            ]
        );
    }

    #[test]
    fn most_missed_ties_keep_task_order_and_limit() {
        let rows = vec![sample_submission(&[("A", "NO"), ("B", "NO"), ("C", "NO")], None)];
        let ranked = most_missed_tasks(&rows, &["C", "A", "B"], 2);
        let names: Vec<&str> = ranked.iter().map(|m| m.task.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[test]
    fn top_staff_skips_degenerate_names() {
        let rows = vec![
            sample_submission(&[("A", "YES - YES"), ("B", "YES - Ana")], None),
            sample_submission(&[("A", "yes - n/a"), ("B", " Ana ")], None),
            sample_submission(&[("A", "Bo"), ("B", "YES")], None),
        ];
        let ranked = top_staff(&rows, &["A", "B"], DEFAULT_LIMIT);
        assert_eq!(
            ranked,
            vec![
                StaffCount { staff: "Ana".to_string(), completed: 2 },
                StaffCount { staff: "Bo".to_string(), completed: 1 },
            ]
        );
    }

    #[test]
    fn top_staff_ties_keep_encounter_order() {
        let rows = vec![
            sample_submission(&[("A", "Zed"), ("B", "Amy")], None),
            sample_submission(&[("A", "Amy"), ("B", "Zed")], None),
        ];
        let ranked = top_staff(&rows, &["A", "B"], 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].staff, "Zed");
    }

    #[test]
    fn top_staff_ties_follow_task_order() {
        let rows = vec![
            sample_submission(&[("A", ""), ("B", "Cy")], None),
            sample_submission(&[("A", "Bo"), ("B", "")], None),
        ];
        let ranked = top_staff(&rows, &["A", "B"], DEFAULT_LIMIT);
        let names: Vec<&str> = ranked.iter().map(|s| s.staff.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Cy"]);
    }

    #[test]
    fn compliance_counts_yes_and_no() {
        let rows = vec![
            sample_submission(&[], Some("YES")),
            sample_submission(&[], Some("yes")),
            sample_submission(&[], Some("Yes ")),
            sample_submission(&[], Some("NO")),
            sample_submission(&[], Some("maybe")),
            sample_submission(&[], None),
        ];
        let compliance = handoff_compliance(&rows);
        assert_eq!(compliance.total, 4);
        assert_eq!(compliance.not_reviewed, 1);
        assert_eq!(compliance.rate, Some(75.0));
    }

    #[test]
    fn compliance_without_answers_has_no_rate() {
        let rows = vec![sample_submission(&[], Some("")), sample_submission(&[], None)];
        let compliance = handoff_compliance(&rows);
        assert_eq!(compliance.total, 0);
        assert_eq!(compliance.rate, None);
    }

    #[test]
    fn analyze_needs_two_submissions() {
        let taxonomy = TaskTaxonomy::default();
        let one = vec![sample_submission(&[("Meds Given", "NO")], Some("YES"))];
        assert!(matches!(
            analyze(&one, &taxonomy, DEFAULT_LIMIT),
            TrendOutcome::Insufficient { submissions: 1 }
        ));

        let two = vec![
            sample_submission(&[("Meds Given", "NO")], Some("YES")),
            sample_submission(&[("Meds Given", "YES - Kiara")], Some("NO")),
        ];
        match analyze(&two, &taxonomy, DEFAULT_LIMIT) {
            TrendOutcome::Ready(report) => {
                assert_eq!(report.most_missed[0].task, "Meds Given");
                assert_eq!(report.top_staff[0].staff, "Kiara");
                assert_eq!(report.compliance.rate, Some(50.0));
            }
            TrendOutcome::Insufficient { .. } => panic!("expected a trend report"),
        }
    }
}
