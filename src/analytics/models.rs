use crate::experiments::models::{ExperimentStatus, SubstrateType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: ExperimentStatus,
    pub count: u64,
}

/// Per-substrate outcome row of the analytics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubstrateSummary {
    pub substrate_type: SubstrateType,
    pub total: u64,
    pub successful: u64,
    pub success_rate: f64,
    /// Absent when no experiment on this substrate has colonized yet
    pub average_colonization_days: Option<f64>,
}

/// Experiments inoculated on one date, with the running total up to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: u64,
    pub cumulative: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_experiments: u64,
    pub overall_success_rate: f64,
    pub average_colonization_days: Option<f64>,
    pub status_distribution: Vec<StatusCount>,
    pub substrates: Vec<SubstrateSummary>,
    pub timeline: Vec<TimelinePoint>,
}

/// Progress and yield of a single experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExperimentSummary {
    pub experiment_id: i32,
    pub days_since_inoculation: i64,
    pub days_to_colonization: Option<i64>,
    pub days_to_first_pin: Option<i64>,
    pub flush_count: u64,
    pub total_fresh_weight_grams: f64,
    /// Absent when the dry substrate weight was never recorded
    pub biological_efficiency: Option<f64>,
    /// Absent once flush numbers are exhausted
    pub next_flush_number: Option<i32>,
}

/// Scope of the analytics summary
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsFilter {
    /// Comma separated substrate types
    #[serde_as(as = "Option<StringWithSeparator::<CommaSeparator, SubstrateType>>")]
    #[param(value_type = Option<String>)]
    pub substrate_type: Option<Vec<SubstrateType>>,
    pub inoculated_from: Option<NaiveDate>,
    pub inoculated_to: Option<NaiveDate>,
    #[serde(default)]
    pub exclude_contaminated: bool,
}
