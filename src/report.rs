use std::fmt::Write;

use crate::models::{
    EquipmentCheck, Handoff, HandoffSection, HandoffTask, Submission, Summary, TrendOutcome,
};
use crate::stats;
use crate::status::TaskStatus;
use crate::taxonomy::TaskTaxonomy;

pub fn build_handoff(submission: &Submission, taxonomy: &TaskTaxonomy) -> Handoff {
    let sections = taxonomy
        .sections
        .iter()
        .map(|section| HandoffSection {
            title: section.title.clone(),
            stats: stats::stats_for(submission, &section.tasks),
            tasks: section
                .tasks
                .iter()
                .filter_map(|task| {
                    submission.status(task).map(|status| HandoffTask {
                        task: task.clone(),
                        status,
                    })
                })
                .collect(),
        })
        .collect();

    let equipment = taxonomy
        .checkboxes
        .iter()
        .map(|checkbox| EquipmentCheck {
            label: checkbox.label.clone(),
            checked: submission
                .value(&checkbox.field)
                .map(|value| {
                    value
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            staff: submission
                .value(&checkbox.staff_field)
                .map(str::trim)
                .filter(|staff| !staff.is_empty())
                .map(str::to_string),
        })
        .collect();

    Handoff {
        submitted_at: submission.submitted_at,
        shift: submission.shift,
        leader: submission.leader_name(),
        reviewed_prior: submission.reviewed_prior.clone(),
        sections,
        equipment,
        narrative: submission.narrative.clone(),
    }
}

pub fn status_icon(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed { .. } => "✅",
        TaskStatus::Missed => "❌",
        TaskStatus::NotApplicable => "➖",
        TaskStatus::Missing => "⚠️",
    }
}

pub fn render_handoff(handoff: &Handoff) -> String {
    let mut output = String::new();
    let leader = if handoff.leader.is_empty() {
        "Unknown"
    } else {
        handoff.leader.as_str()
    };

    let _ = writeln!(output, "## Shift Handoff");
    let _ = writeln!(
        output,
        "**{} Shift** ({})",
        handoff.shift.label(),
        handoff.submitted_at.format("%B %d, %Y at %I:%M %p")
    );
    let _ = writeln!(output, "Shift Leader: **{}**", leader);
    let _ = writeln!(
        output,
        "Reviewed prior checklist: **{}**",
        handoff.reviewed_prior.as_deref().unwrap_or("Unknown")
    );

    for section in &handoff.sections {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "### {} ({:.0}% complete)",
            section.title, section.stats.rate
        );
        if section.tasks.is_empty() {
            let _ = writeln!(output, "No tasks recorded for this section.");
            continue;
        }
        for task in &section.tasks {
            let _ = writeln!(
                output,
                "- {} {}: {}",
                status_icon(&task.status),
                task.task,
                task.status.staff().unwrap_or("—")
            );
        }
    }

    if !handoff.equipment.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Keys & Equipment");
        for check in &handoff.equipment {
            let checked = if check.checked.is_empty() {
                "Not recorded".to_string()
            } else {
                check.checked.join(", ")
            };
            let _ = writeln!(
                output,
                "- **{}:** {} (staff: {})",
                check.label,
                checked,
                check.staff.as_deref().unwrap_or("—")
            );
        }
    }

    if let Some(narrative) = &handoff.narrative {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Shift Notes");
        for line in narrative.lines() {
            let _ = writeln!(output, "> {}", line);
        }
    }

    output
}

pub fn render_summary(summary: &Summary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total submissions: {}", summary.total_submissions);
    let _ = writeln!(output, "- Today's submissions: {}", summary.today_submissions);
    let _ = writeln!(
        output,
        "- Last {} days: {} submissions, average completion {:.1}%",
        summary.window_days, summary.window_submissions, summary.window_avg_rate
    );
    let _ = writeln!(
        output,
        "- All time average completion: {:.1}%",
        summary.overall_avg_rate
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Sections (last {} days)", summary.window_days);
    for section in &summary.sections {
        let stats = &section.stats;
        let _ = writeln!(
            output,
            "- {}: {:.1}% ({} done, {} missed, {} n/a, {} blank)",
            section.section, stats.rate, stats.completed, stats.missed, stats.na, stats.missing
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Submissions by Shift Type");
    if summary.shifts.is_empty() {
        let _ = writeln!(output, "No AM, PM or Overnight submissions yet.");
    } else {
        for shift in &summary.shifts {
            let _ = writeln!(
                output,
                "- {}: {} submissions (avg completion {:.1}%)",
                shift.shift.label(),
                shift.submissions,
                shift.avg_rate
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Daily Completion");
    for day in summary.daily.iter().take(7) {
        let _ = writeln!(
            output,
            "- {}: {} submissions (avg completion {:.1}%)",
            day.date, day.submissions, day.avg_rate
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Recent Submissions");
    for recent in &summary.recent {
        let _ = writeln!(
            output,
            "- {} | {} | {} | {:.0}%",
            recent.submitted_at.format("%m/%d/%Y %I:%M %p"),
            recent.leader,
            recent.shift.label(),
            recent.rate
        );
    }

    output
}

pub fn render_trends(outcome: &TrendOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Trends");

    let report = match outcome {
        TrendOutcome::Insufficient { .. } => {
            let _ = writeln!(
                output,
                "Need more submissions to show trends. Data will appear as more checklists are submitted."
            );
            return output;
        }
        TrendOutcome::Ready(report) => report,
    };

    let _ = writeln!(output);
    let _ = writeln!(output, "### Most Missed Tasks");
    if report.most_missed.is_empty() {
        let _ = writeln!(output, "No tasks have been marked as missed.");
    } else {
        for missed in &report.most_missed {
            let _ = writeln!(
                output,
                "- {}: missed on {} of {} shifts",
                missed.task, missed.missed, report.submissions
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Staff Task Completion");
    if report.top_staff.is_empty() {
        let _ = writeln!(
            output,
            "Staff completion data will appear as more checklists are submitted."
        );
    } else {
        for staff in &report.top_staff {
            let _ = writeln!(output, "- {}: {} tasks", staff.staff, staff.completed);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Shift Handoff Compliance");
    let compliance = &report.compliance;
    match compliance.rate {
        None => {
            let _ = writeln!(output, "No shifts have answered the review question yet.");
        }
        Some(rate) => {
            let _ = writeln!(
                output,
                "Reviewed prior checklist: {} of {} shifts ({:.0}%)",
                compliance.reviewed, compliance.total, rate
            );
            if compliance.not_reviewed > 0 {
                let _ = writeln!(
                    output,
                    "{} shifts did not review the prior checklist.",
                    compliance.not_reviewed
                );
            } else {
                let _ = writeln!(output, "All shifts reviewing prior checklists.");
            }
        }
    }

    output
}

pub fn build_report(handoff: &Handoff, summary: &Summary, trends: &TrendOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Shift Leader Dashboard");
    let _ = writeln!(output);
    output.push_str(&render_handoff(handoff));
    let _ = writeln!(output);
    output.push_str(&render_summary(summary));
    let _ = writeln!(output);
    output.push_str(&render_trends(trends));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use chrono::NaiveDate;

    fn handoff_row() -> Submission {
        let cells = [
            ("Meds Given", "YES - Alice"),
            ("Prepare Breakfast", "NO"),
            ("Clean Kitchen", "N/A"),
            ("All Keys Available", "Front door\nOffice\n"),
            ("Staff Reviewed Keys", " Bo "),
            ("Dishwasher (check all that apply)", ""),
        ];
        Submission {
            submitted_at: NaiveDate::from_ymd_opt(2026, 2, 2)
                .and_then(|date| date.and_hms_opt(15, 30, 0))
                .unwrap(),
            shift: ShiftType::Pm,
            leader_first: "Kiara".to_string(),
            leader_last: "Patel".to_string(),
            fields: cells
                .iter()
                .map(|(task, value)| (task.to_string(), value.to_string()))
                .collect(),
            narrative: Some("Fridge door sticks.".to_string()),
            reviewed_prior: Some("YES".to_string()),
        }
    }

    #[test]
    fn handoff_lists_only_recorded_tasks() {
        let handoff = build_handoff(&handoff_row(), &TaskTaxonomy::default());
        assert_eq!(handoff.leader, "Kiara Patel");
        assert_eq!(handoff.sections.len(), 3);
        assert_eq!(handoff.sections[0].tasks.len(), 1);
        assert_eq!(handoff.sections[1].tasks.len(), 2);
        assert!(handoff.sections[2].tasks.is_empty());
        assert_eq!(handoff.sections[1].stats.missed, 1);
    }

    #[test]
    fn handoff_splits_checkbox_values() {
        let handoff = build_handoff(&handoff_row(), &TaskTaxonomy::default());
        assert_eq!(handoff.equipment[0].checked, vec!["Front door", "Office"]);
        assert_eq!(handoff.equipment[0].staff.as_deref(), Some("Bo"));
        assert!(handoff.equipment[1].checked.is_empty());
        assert_eq!(handoff.equipment[2].staff, None);
    }

    #[test]
    fn handoff_markdown_shows_icons_and_staff() {
        let rendered = render_handoff(&build_handoff(&handoff_row(), &TaskTaxonomy::default()));
        assert!(rendered.contains("**PM Shift** (February 02, 2026 at 03:30 PM)"));
        assert!(rendered.contains("- ✅ Meds Given: Alice"));
        assert!(rendered.contains("- ❌ Prepare Breakfast: —"));
        assert!(rendered.contains("- **Keys:** Front door, Office (staff: Bo)"));
        assert!(rendered.contains("> Fridge door sticks."));
    }

    #[test]
    fn trends_markdown_reports_insufficient_data() {
        let rendered = render_trends(&TrendOutcome::Insufficient { submissions: 1 });
        assert!(rendered.contains("Need more submissions"));
    }
}
