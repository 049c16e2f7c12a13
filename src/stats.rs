use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{
    CompletionStats, DailySummary, RecentSubmission, SectionSummary, ShiftType, ShiftTypeSummary,
    Submission, Summary,
};
use crate::taxonomy::TaskTaxonomy;

const RECENT_LIMIT: usize = 10;

/// Tally `tasks` for one submission. Tasks whose column is absent from
/// the submission are skipped rather than counted as missing.
pub fn stats_for<S: AsRef<str>>(submission: &Submission, tasks: &[S]) -> CompletionStats {
    let mut stats = CompletionStats::default();
    for task in tasks {
        if let Some(status) = submission.status(task.as_ref()) {
            stats.record(&status);
        }
    }
    stats
}

pub fn section_stats(
    submission: &Submission,
    taxonomy: &TaskTaxonomy,
    section: &str,
) -> Option<CompletionStats> {
    taxonomy
        .section(section)
        .map(|section| stats_for(submission, &section.tasks))
}

/// Merged per-section stats across `submissions`, in taxonomy order.
pub fn section_breakdown<'a, I>(submissions: I, taxonomy: &TaskTaxonomy) -> Vec<SectionSummary>
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut totals = vec![CompletionStats::default(); taxonomy.sections.len()];
    for submission in submissions {
        for (total, section) in totals.iter_mut().zip(&taxonomy.sections) {
            total.merge(&stats_for(submission, &section.tasks));
        }
    }

    taxonomy
        .sections
        .iter()
        .zip(totals)
        .map(|(section, stats)| SectionSummary {
            section: section.title.clone(),
            stats,
        })
        .collect()
}

/// Mean of per-submission rates; 0 for an empty cohort.
pub fn average_rate<'a, I, S>(submissions: I, tasks: &[S]) -> f64
where
    I: IntoIterator<Item = &'a Submission>,
    S: AsRef<str>,
{
    let mut total = 0.0;
    let mut count = 0usize;
    for submission in submissions {
        total += stats_for(submission, tasks).rate;
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Start of a trailing window; saturates to the earliest time rather than
/// overflowing on very large `days`.
pub fn window_start(now: NaiveDateTime, days: i64) -> NaiveDateTime {
    Duration::try_days(days.max(1))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(NaiveDateTime::MIN)
}

pub fn within_days(submissions: &[Submission], now: NaiveDateTime, days: i64) -> Vec<&Submission> {
    let cutoff = window_start(now, days);
    submissions
        .iter()
        .filter(|submission| submission.submitted_at >= cutoff)
        .collect()
}

pub fn by_shift_type(submissions: &[Submission], shift: ShiftType) -> Vec<&Submission> {
    submissions
        .iter()
        .filter(|submission| submission.shift == shift)
        .collect()
}

pub fn on_date(submissions: &[Submission], date: NaiveDate) -> Vec<&Submission> {
    submissions
        .iter()
        .filter(|submission| submission.date() == date)
        .collect()
}

pub fn shift_breakdown<S: AsRef<str>>(
    submissions: &[Submission],
    tasks: &[S],
) -> Vec<ShiftTypeSummary> {
    ShiftType::KNOWN
        .iter()
        .filter_map(|&shift| {
            let cohort = by_shift_type(submissions, shift);
            if cohort.is_empty() {
                return None;
            }
            Some(ShiftTypeSummary {
                shift,
                submissions: cohort.len(),
                avg_rate: average_rate(cohort.iter().copied(), tasks),
            })
        })
        .collect()
}

/// One entry per calendar date present, newest first.
pub fn daily_breakdown<S: AsRef<str>>(submissions: &[Submission], tasks: &[S]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for submission in submissions {
        let entry = days.entry(submission.date()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += stats_for(submission, tasks).rate;
    }

    days.into_iter()
        .rev()
        .map(|(date, (count, total_rate))| DailySummary {
            date,
            submissions: count,
            avg_rate: total_rate / count as f64,
        })
        .collect()
}

pub fn recent_submissions<S: AsRef<str>>(
    submissions: &[Submission],
    tasks: &[S],
    limit: usize,
) -> Vec<RecentSubmission> {
    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    ordered
        .into_iter()
        .take(limit)
        .map(|submission| RecentSubmission {
            submitted_at: submission.submitted_at,
            leader: submission.leader_name(),
            shift: submission.shift,
            rate: stats_for(submission, tasks).rate,
        })
        .collect()
}

pub fn summarize(
    submissions: &[Submission],
    taxonomy: &TaskTaxonomy,
    now: NaiveDateTime,
    window_days: i64,
) -> Summary {
    let tasks = taxonomy.all_tasks();
    let window = within_days(submissions, now, window_days);

    Summary {
        total_submissions: submissions.len(),
        today_submissions: on_date(submissions, now.date()).len(),
        window_days,
        window_submissions: window.len(),
        window_avg_rate: average_rate(window.iter().copied(), &tasks),
        overall_avg_rate: average_rate(submissions, &tasks),
        sections: section_breakdown(window.iter().copied(), taxonomy),
        shifts: shift_breakdown(submissions, &tasks),
        daily: daily_breakdown(submissions, &tasks),
        recent: recent_submissions(submissions, &tasks, RECENT_LIMIT),
    }
}
