use super::metrics::{
    average_colonization_days, biological_efficiency, days_elapsed, experiment_summary,
    experiment_timeline, overall_average_colonization_days, overall_success_rate,
    status_distribution, substrate_summaries, success_rate, success_rate_by_category, summarize,
};
use crate::common::errors::AppError;
use crate::common::utils::today;
use crate::config::test_helpers::setup_test_app;
use crate::experiments::models::{self as experiments, ExperimentStatus, SubstrateType};
use crate::harvests::models as harvests;
use crate::test_helpers::{create_test_experiment_from, create_test_harvest, send_json};
use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn jan(day: u32) -> NaiveDate {
    date(2024, 1, day)
}

fn experiment(
    id: i32,
    substrate_type: SubstrateType,
    inoculated: NaiveDate,
    colonized: Option<NaiveDate>,
    status: ExperimentStatus,
) -> experiments::Model {
    experiments::Model {
        id,
        name: format!("Batch {id}"),
        substrate_type,
        substrate_details: None,
        spawn_ratio: experiments::DEFAULT_SPAWN_RATIO,
        substrate_weight_kg: None,
        container_type: None,
        inoculation_date: inoculated,
        colonization_date: colonized,
        first_pin_date: None,
        status,
        contamination_type: None,
        contamination_notes: None,
        notes: None,
        created_at: Utc::now(),
    }
}

fn harvest(id: i32, experiment_id: i32, flush_number: i32, grams: f64) -> harvests::Model {
    harvests::Model {
        id,
        experiment_id,
        flush_number,
        harvest_date: date(2024, 2, 1),
        fresh_weight_grams: grams,
        quality_notes: None,
        created_at: Utc::now(),
    }
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn test_days_elapsed() {
    assert_eq!(days_elapsed(jan(1), Some(jan(15))).unwrap(), 14);
    assert_eq!(days_elapsed(date(2024, 2, 28), Some(date(2024, 3, 1))).unwrap(), 2);
    assert_eq!(days_elapsed(jan(1), Some(jan(1))).unwrap(), 0);
    assert_eq!(days_elapsed(today() - Duration::days(7), None).unwrap(), 7);
}

#[test]
fn test_days_elapsed_rejects_end_before_start() {
    let err = days_elapsed(jan(15), Some(jan(1))).unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "end_date"));
}

#[test]
fn test_biological_efficiency() {
    assert!(close(biological_efficiency(800.0, Some(1.0)).unwrap(), 80.0));
    assert!(close(biological_efficiency(1250.0, Some(2.5)).unwrap(), 50.0));
    assert!(close(biological_efficiency(333.0, Some(1.0)).unwrap(), 33.3));
    assert!(close(biological_efficiency(0.0, Some(1.0)).unwrap(), 0.0));
}

#[test]
fn test_biological_efficiency_requires_positive_dry_weight() {
    for dry_weight in [None, Some(0.0), Some(-1.0)] {
        let err = biological_efficiency(800.0, dry_weight).unwrap_err();
        assert!(
            matches!(err, AppError::Validation { ref field, .. } if field == "substrate_weight_kg")
        );
    }

    let err = biological_efficiency(-5.0, Some(1.0)).unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "fresh_weight_grams"));
}

#[test]
fn test_success_rate() {
    assert!(close(success_rate(0, 0), 0.0));
    assert!(close(success_rate(2, 1), 50.0));
    assert!(close(success_rate(3, 1), 66.7));
    assert!(close(success_rate(4, 0), 100.0));
    assert!(close(success_rate(4, 4), 0.0));
}

#[test]
fn test_average_colonization_days_skips_uncolonized() {
    let experiments = vec![
        experiment(1, SubstrateType::Straw, jan(1), Some(jan(11)), ExperimentStatus::Colonizing),
        experiment(2, SubstrateType::Straw, jan(1), Some(jan(16)), ExperimentStatus::Pinning),
        experiment(3, SubstrateType::Straw, jan(1), None, ExperimentStatus::Inoculating),
        experiment(4, SubstrateType::Coffee, jan(1), None, ExperimentStatus::Inoculating),
        experiment(5, SubstrateType::Sawdust, jan(1), Some(jan(22)), ExperimentStatus::Fruiting),
    ];

    let averages = average_colonization_days(&experiments);
    assert_eq!(averages.len(), 2);
    assert!(close(averages[&SubstrateType::Straw], 12.5));
    assert!(close(averages[&SubstrateType::Sawdust], 21.0));
    assert!(!averages.contains_key(&SubstrateType::Coffee));

    let overall = overall_average_colonization_days(&experiments).unwrap();
    assert!(close(overall, (10.0 + 15.0 + 21.0) / 3.0));

    assert_eq!(overall_average_colonization_days(&experiments[2..4]), None);
}

#[test]
fn test_success_rate_by_category() {
    let experiments = vec![
        experiment(1, SubstrateType::Coffee, jan(1), None, ExperimentStatus::Contaminated),
        experiment(2, SubstrateType::Coffee, jan(2), None, ExperimentStatus::Done),
        experiment(3, SubstrateType::Cardboard, jan(3), None, ExperimentStatus::Fruiting),
    ];

    let rates = success_rate_by_category(&experiments);
    assert!(close(rates[&SubstrateType::Coffee], 50.0));
    assert!(close(rates[&SubstrateType::Cardboard], 100.0));
    assert!(!rates.contains_key(&SubstrateType::Straw));

    assert!(close(overall_success_rate(&experiments), 66.7));
    assert!(close(overall_success_rate(&[]), 0.0));
}

#[test]
fn test_status_distribution_lists_every_status_in_order() {
    let experiments = vec![
        experiment(1, SubstrateType::Straw, jan(1), None, ExperimentStatus::Fruiting),
        experiment(2, SubstrateType::Straw, jan(2), None, ExperimentStatus::Fruiting),
        experiment(3, SubstrateType::Straw, jan(3), None, ExperimentStatus::Contaminated),
    ];

    let distribution = status_distribution(&experiments);
    let statuses: Vec<ExperimentStatus> = distribution.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            ExperimentStatus::Inoculating,
            ExperimentStatus::Colonizing,
            ExperimentStatus::Pinning,
            ExperimentStatus::Fruiting,
            ExperimentStatus::Done,
            ExperimentStatus::Contaminated,
        ]
    );
    let counts: Vec<u64> = distribution.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![0, 0, 0, 2, 0, 1]);

    assert!(status_distribution(&[]).iter().all(|s| s.count == 0));
}

#[test]
fn test_experiment_timeline_is_cumulative() {
    let experiments = vec![
        experiment(1, SubstrateType::Straw, jan(10), None, ExperimentStatus::Inoculating),
        experiment(2, SubstrateType::Straw, jan(1), None, ExperimentStatus::Inoculating),
        experiment(3, SubstrateType::Coffee, jan(10), None, ExperimentStatus::Inoculating),
        experiment(4, SubstrateType::Coffee, date(2024, 2, 1), None, ExperimentStatus::Inoculating),
    ];

    let timeline = experiment_timeline(&experiments);
    let points: Vec<(NaiveDate, u64, u64)> = timeline
        .iter()
        .map(|p| (p.date, p.count, p.cumulative))
        .collect();
    assert_eq!(
        points,
        vec![
            (jan(1), 1, 1),
            (jan(10), 2, 3),
            (date(2024, 2, 1), 1, 4),
        ]
    );
    assert!(experiment_timeline(&[]).is_empty());
}

#[test]
fn test_substrate_summaries_and_summarize() {
    let experiments = vec![
        experiment(1, SubstrateType::Straw, jan(1), Some(jan(11)), ExperimentStatus::Done),
        experiment(2, SubstrateType::Straw, jan(2), Some(jan(13)), ExperimentStatus::Fruiting),
        experiment(3, SubstrateType::Straw, jan(3), None, ExperimentStatus::Contaminated),
        experiment(4, SubstrateType::Cardboard, jan(4), None, ExperimentStatus::Inoculating),
    ];

    let summaries = substrate_summaries(&experiments);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].substrate_type, SubstrateType::Cardboard);
    assert_eq!(summaries[0].average_colonization_days, None);
    assert_eq!(summaries[1].substrate_type, SubstrateType::Straw);
    assert_eq!(summaries[1].total, 3);
    assert_eq!(summaries[1].successful, 2);
    assert!(close(summaries[1].success_rate, 66.7));
    assert_eq!(summaries[1].average_colonization_days, Some(10.5));

    let summary = summarize(&experiments);
    assert_eq!(summary.total_experiments, 4);
    assert!(close(summary.overall_success_rate, 75.0));
    assert_eq!(summary.average_colonization_days, Some(10.5));
    assert_eq!(summary.status_distribution.len(), 6);
    assert_eq!(summary.timeline.last().map(|p| p.cumulative), Some(4));
}

#[test]
fn test_experiment_summary_totals_harvests() {
    let mut record = experiment(
        7,
        SubstrateType::Coffee,
        jan(1),
        Some(jan(15)),
        ExperimentStatus::Fruiting,
    );
    record.first_pin_date = Some(jan(20));
    record.substrate_weight_kg = Some(1.0);

    let harvests = vec![harvest(1, 7, 1, 500.0), harvest(2, 7, 2, 300.0)];
    let summary = experiment_summary(&record, &harvests).unwrap();

    assert_eq!(summary.experiment_id, 7);
    assert_eq!(summary.days_to_colonization, Some(14));
    assert_eq!(summary.days_to_first_pin, Some(19));
    assert_eq!(
        summary.days_since_inoculation,
        (today() - jan(1)).num_days()
    );
    assert_eq!(summary.flush_count, 2);
    assert!(close(summary.total_fresh_weight_grams, 800.0));
    assert_eq!(summary.biological_efficiency, Some(80.0));
    assert_eq!(summary.next_flush_number, Some(3));
}

#[test]
fn test_experiment_summary_without_harvests_or_weight() {
    let record = experiment(1, SubstrateType::Mix, jan(1), None, ExperimentStatus::Inoculating);

    let summary = experiment_summary(&record, &[]).unwrap();
    assert_eq!(summary.flush_count, 0);
    assert!(close(summary.total_fresh_weight_grams, 0.0));
    assert_eq!(summary.biological_efficiency, None);
    assert_eq!(summary.days_to_colonization, None);
    assert_eq!(summary.next_flush_number, Some(1));
}

#[tokio::test]
async fn test_analytics_endpoint_on_empty_store() {
    let app = setup_test_app().await;

    let (status, body) = send_json(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_experiments"], 0);
    assert_eq!(body["overall_success_rate"], 0.0);
    assert!(body["average_colonization_days"].is_null());
    assert_eq!(body["status_distribution"].as_array().unwrap().len(), 6);
    assert!(body["timeline"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analytics_endpoint_filters() {
    let app = setup_test_app().await;

    create_test_experiment_from(
        &app,
        json!({
            "name": "Straw colonized",
            "substrate_type": "straw",
            "inoculation_date": "2024-01-01",
            "colonization_date": "2024-01-15",
            "status": "colonizing"
        }),
    )
    .await
    .unwrap();
    create_test_experiment_from(
        &app,
        json!({
            "name": "Straw lost",
            "substrate_type": "straw",
            "inoculation_date": "2024-01-05",
            "status": "contaminated",
            "contamination_type": "trichoderma"
        }),
    )
    .await
    .unwrap();
    create_test_experiment_from(
        &app,
        json!({
            "name": "Coffee",
            "substrate_type": "coffee",
            "inoculation_date": "2024-03-01"
        }),
    )
    .await
    .unwrap();

    let (status, all) = send_json(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total_experiments"], 3);
    assert_eq!(all["overall_success_rate"], 66.7);
    assert_eq!(all["average_colonization_days"], 14.0);

    let (status, healthy) =
        send_json(&app, "GET", "/api/analytics?exclude_contaminated=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(healthy["total_experiments"], 2);
    assert_eq!(healthy["overall_success_rate"], 100.0);

    let (status, straw) = send_json(
        &app,
        "GET",
        "/api/analytics?substrate_type=straw&inoculated_to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(straw["total_experiments"], 2);
    assert_eq!(straw["overall_success_rate"], 50.0);
    assert_eq!(straw["substrates"].as_array().unwrap().len(), 1);
    assert_eq!(straw["substrates"][0]["substrate_type"], "straw");
    assert_eq!(straw["timeline"][1]["cumulative"], 2);
}

#[tokio::test]
async fn test_experiment_summary_endpoint() {
    let app = setup_test_app().await;

    let (experiment_id, _) = create_test_experiment_from(
        &app,
        json!({
            "name": "Yield run",
            "substrate_type": "cardboard",
            "inoculation_date": "2024-01-01",
            "colonization_date": "2024-01-15",
            "substrate_weight_kg": 1.0,
            "status": "fruiting"
        }),
    )
    .await
    .unwrap();
    create_test_harvest(&app, experiment_id, "2024-02-01", 500.0)
        .await
        .unwrap();
    create_test_harvest(&app, experiment_id, "2024-02-12", 300.0)
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/experiments/{experiment_id}/summary"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["experiment_id"], experiment_id);
    assert_eq!(body["days_to_colonization"], 14);
    assert_eq!(body["flush_count"], 2);
    assert_eq!(body["total_fresh_weight_grams"], 800.0);
    assert_eq!(body["biological_efficiency"], 80.0);
    assert_eq!(body["next_flush_number"], 3);

    let (status, _) = send_json(&app, "GET", "/api/experiments/999/summary", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
