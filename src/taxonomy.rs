use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const SUBMISSION_DATE: &str = "Submission Date";
pub const SHIFT: &str = "Shift";
pub const LEADER_FIRST_NAME: &str = "Shift Leader Name - First Name";
pub const LEADER_LAST_NAME: &str = "Shift Leader Name - Last Name";
pub const NARRATIVE: &str = "Narrative to Include Shift Issues/Comments and Info for Next Shift";
pub const REVIEWED_PRIOR: &str =
    "Did You Review the Last Shift Checklist at the Beginning of your Shift?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSection {
    pub name: String,
    pub title: String,
    pub tasks: Vec<String>,
}

/// A multi-value checklist item with its own "staff responsible" column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxTask {
    pub label: String,
    pub field: String,
    pub staff_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTaxonomy {
    pub sections: Vec<TaskSection>,
    #[serde(default)]
    pub checkboxes: Vec<CheckboxTask>,
}

impl TaskTaxonomy {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read taxonomy {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid taxonomy in {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let taxonomy: TaskTaxonomy = serde_json::from_str(raw)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Each task may appear in only one section.
    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            for task in &section.tasks {
                if !seen.insert(task.as_str()) {
                    anyhow::bail!("task {task:?} is listed in more than one section");
                }
            }
        }
        Ok(())
    }

    pub fn section(&self, name: &str) -> Option<&TaskSection> {
        self.sections
            .iter()
            .find(|section| section.name.eq_ignore_ascii_case(name))
    }

    pub fn section_of(&self, task: &str) -> Option<&TaskSection> {
        self.sections
            .iter()
            .find(|section| section.tasks.iter().any(|t| t == task))
    }

    /// Every sectioned task in section order; checkbox tasks are excluded.
    pub fn all_tasks(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|section| section.tasks.iter().map(String::as_str))
            .collect()
    }
}

impl Default for TaskTaxonomy {
    fn default() -> Self {
        fn section(name: &str, title: &str, tasks: &[&str]) -> TaskSection {
            TaskSection {
                name: name.to_string(),
                title: title.to_string(),
                tasks: tasks.iter().map(|task| task.to_string()).collect(),
            }
        }

        fn checkbox(label: &str, field: &str, staff_field: &str) -> CheckboxTask {
            CheckboxTask {
                label: label.to_string(),
                field: field.to_string(),
                staff_field: staff_field.to_string(),
            }
        }

        TaskTaxonomy {
            sections: vec![
                section(
                    "General",
                    "General Duties",
                    &[
                        "Meds Given",
                        "Unannounced Rounds Every 2 Hours in Apricot",
                        "Conduct Fire Drill If Scheduled",
                        "Youth Taken to Appointments (Logbook / Whiteboard)",
                        "Shift Report Completed in Apricot",
                        "Informational or Behavioral Notes Submitted",
                        "Verbal Review to Next Shift",
                    ],
                ),
                section(
                    "Kitchen",
                    "Kitchen",
                    &[
                        "Prepare Breakfast",
                        "Prepare Lunch",
                        // Matches the form's column header.
                        "Prepare DInner",
                        "Clean Kitchen",
                        "Defrost Food",
                        "Date Food",
                        "Dispose of Any Expired Food",
                        "Fill Out Refrigerator Temperature Log",
                        "Take Out Trash",
                    ],
                ),
                section(
                    "Facility",
                    "Facility",
                    &[
                        "Clean and Tidy Common Area/Dining Room",
                        "Clean and Tidy 2nd Floor Lounge",
                        "Check & Restock House Paper Products / Soap, etc.",
                        "Bring In and Put Away Deliveries",
                        "All Youth Chores Completed",
                        "Tidy Youth Worker Office Area",
                        "Seasonal Snow Clean Up Assistance",
                        "Seasonal Water Plants and Clean Up Outside Area",
                    ],
                ),
            ],
            checkboxes: vec![
                checkbox("Keys", "All Keys Available", "Staff Reviewed Keys"),
                checkbox(
                    "Dishwasher",
                    "Dishwasher (check all that apply)",
                    "Staff Managed Dishwasher",
                ),
                checkbox(
                    "Laundry",
                    "Laundry (Clothes, Bedding/Towels, Kitchen Clothes) Check All That Apply",
                    "Staff Managed Laundry",
                ),
            ],
        }
    }
}
