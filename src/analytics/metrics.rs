//! Derived values over experiment and harvest records.
//!
//! Everything here is a pure function of its arguments: callers fetch records
//! from the store and pass them in, so storage errors never originate here.

use super::models::{
    AnalyticsSummary, ExperimentSummary, StatusCount, SubstrateSummary, TimelinePoint,
};
use crate::common::errors::AppResult;
use crate::common::utils::{round_to_tenth, today};
use crate::experiments::models::{ExperimentStatus, Model as Experiment, SubstrateType};
use crate::harvests::models::Model as Harvest;
use crate::validation_error;
use chrono::NaiveDate;
use sea_orm::Iterable;
use std::collections::BTreeMap;

/// Whole days from `start` to `end`, with `end` defaulting to today.
pub fn days_elapsed(start: NaiveDate, end: Option<NaiveDate>) -> AppResult<i64> {
    let end = end.unwrap_or_else(today);
    if end < start {
        return Err(validation_error!(
            "end_date",
            format!("end date {end} is before start date {start}")
        ));
    }
    Ok((end - start).num_days())
}

/// Biological efficiency in percent: fresh grams over dry substrate grams.
///
/// Undefined without a positive dry substrate weight, reported as a
/// validation error rather than an infinite or NaN value.
pub fn biological_efficiency(
    total_fresh_weight_grams: f64,
    dry_substrate_weight_kg: Option<f64>,
) -> AppResult<f64> {
    let Some(dry_kg) = dry_substrate_weight_kg.filter(|kg| *kg > 0.0) else {
        return Err(validation_error!(
            "substrate_weight_kg",
            "dry substrate weight must be recorded and greater than zero"
        ));
    };
    if !(total_fresh_weight_grams >= 0.0) {
        return Err(validation_error!(
            "fresh_weight_grams",
            "harvested weight cannot be negative"
        ));
    }

    Ok(round_to_tenth(
        (total_fresh_weight_grams / 1000.0) / dry_kg * 100.0,
    ))
}

/// Percentage of experiments that did not end contaminated; 0 when empty.
#[allow(clippy::cast_precision_loss)]
pub fn success_rate(total: u64, contaminated: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let successful = total.saturating_sub(contaminated);
    round_to_tenth(successful as f64 / total as f64 * 100.0)
}

fn colonization_days(experiment: &Experiment) -> Option<i64> {
    let colonized = experiment.colonization_date?;
    days_elapsed(experiment.inoculation_date, Some(colonized)).ok()
}

/// Mean days from inoculation to colonization per substrate.
///
/// Experiments without a colonization date are left out entirely, and a
/// substrate with no colonized experiment has no entry.
#[allow(clippy::cast_precision_loss)]
pub fn average_colonization_days(experiments: &[Experiment]) -> BTreeMap<SubstrateType, f64> {
    let mut totals: BTreeMap<SubstrateType, (i64, u32)> = BTreeMap::new();
    for experiment in experiments {
        if let Some(days) = colonization_days(experiment) {
            let entry = totals.entry(experiment.substrate_type).or_default();
            entry.0 += days;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(substrate, (days, count))| (substrate, days as f64 / f64::from(count)))
        .collect()
}

/// Mean days to colonization across all substrates.
#[allow(clippy::cast_precision_loss)]
pub fn overall_average_colonization_days(experiments: &[Experiment]) -> Option<f64> {
    let days: Vec<i64> = experiments.iter().filter_map(colonization_days).collect();
    if days.is_empty() {
        return None;
    }
    Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

fn outcome_counts(experiments: &[Experiment]) -> BTreeMap<SubstrateType, (u64, u64)> {
    let mut counts: BTreeMap<SubstrateType, (u64, u64)> = BTreeMap::new();
    for experiment in experiments {
        let entry = counts.entry(experiment.substrate_type).or_default();
        entry.0 += 1;
        if experiment.status == ExperimentStatus::Contaminated {
            entry.1 += 1;
        }
    }
    counts
}

/// Success rate per substrate present in `experiments`.
pub fn success_rate_by_category(experiments: &[Experiment]) -> BTreeMap<SubstrateType, f64> {
    outcome_counts(experiments)
        .into_iter()
        .map(|(substrate, (total, contaminated))| (substrate, success_rate(total, contaminated)))
        .collect()
}

pub fn overall_success_rate(experiments: &[Experiment]) -> f64 {
    let contaminated = experiments
        .iter()
        .filter(|e| e.status == ExperimentStatus::Contaminated)
        .count();
    success_rate(experiments.len() as u64, contaminated as u64)
}

/// Count per status, always listing all six statuses in lifecycle order.
pub fn status_distribution(experiments: &[Experiment]) -> Vec<StatusCount> {
    ExperimentStatus::iter()
        .map(|status| StatusCount {
            status,
            count: experiments.iter().filter(|e| e.status == status).count() as u64,
        })
        .collect()
}

pub fn substrate_summaries(experiments: &[Experiment]) -> Vec<SubstrateSummary> {
    let averages = average_colonization_days(experiments);
    let rates = success_rate_by_category(experiments);

    outcome_counts(experiments)
        .into_iter()
        .map(|(substrate_type, (total, contaminated))| SubstrateSummary {
            substrate_type,
            total,
            successful: total - contaminated,
            success_rate: rates.get(&substrate_type).copied().unwrap_or_default(),
            average_colonization_days: averages.get(&substrate_type).copied().map(round_to_tenth),
        })
        .collect()
}

/// Inoculations per date in ascending order with a running total.
pub fn experiment_timeline(experiments: &[Experiment]) -> Vec<TimelinePoint> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for experiment in experiments {
        *per_day.entry(experiment.inoculation_date).or_default() += 1;
    }

    let mut cumulative = 0;
    per_day
        .into_iter()
        .map(|(date, count)| {
            cumulative += count;
            TimelinePoint {
                date,
                count,
                cumulative,
            }
        })
        .collect()
}

pub fn summarize(experiments: &[Experiment]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_experiments: experiments.len() as u64,
        overall_success_rate: overall_success_rate(experiments),
        average_colonization_days: overall_average_colonization_days(experiments)
            .map(round_to_tenth),
        status_distribution: status_distribution(experiments),
        substrates: substrate_summaries(experiments),
        timeline: experiment_timeline(experiments),
    }
}

/// Flush number following `highest`, starting at 1.
///
/// `None` once the counter would pass `i32::MAX`.
pub fn flush_after(highest: Option<i32>) -> Option<i32> {
    highest.map_or(Some(1), |n| n.checked_add(1))
}

/// Progress and yield of `experiment` from its own harvests.
pub fn experiment_summary(
    experiment: &Experiment,
    harvests: &[Harvest],
) -> AppResult<ExperimentSummary> {
    let total_fresh_weight_grams: f64 = harvests.iter().map(|h| h.fresh_weight_grams).sum();
    let since_inoculation = |date: Option<NaiveDate>| {
        date.and_then(|d| days_elapsed(experiment.inoculation_date, Some(d)).ok())
    };

    Ok(ExperimentSummary {
        experiment_id: experiment.id,
        days_since_inoculation: days_elapsed(experiment.inoculation_date, None)?,
        days_to_colonization: since_inoculation(experiment.colonization_date),
        days_to_first_pin: since_inoculation(experiment.first_pin_date),
        flush_count: harvests.len() as u64,
        total_fresh_weight_grams,
        biological_efficiency: biological_efficiency(
            total_fresh_weight_grams,
            experiment.substrate_weight_kg,
        )
        .ok(),
        next_flush_number: flush_after(harvests.iter().map(|h| h.flush_number).max()),
    })
}
