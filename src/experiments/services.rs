use super::models::{
    ActiveModel, Column, Entity, ExperimentCreate, ExperimentFilter, ExperimentSort,
    ExperimentStats, ExperimentStatus, ExperimentUpdate, Model,
};
use crate::analytics::metrics;
use crate::common::errors::AppResult;
use crate::common::utils::{normalize_text, today};
use crate::harvests::models as harvests;
use crate::{not_found, validation_error};
use chrono::{NaiveDate, Utc};
use crudcrate::traits::MergeIntoActiveModel;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Select, TransactionTrait, TryIntoModel,
};
use tracing::{debug, info};

const MAX_SPAWN_RATIO: f64 = 50.0;
const MAX_SUBSTRATE_WEIGHT_KG: f64 = 100.0;

/// Check a complete experiment record against the field rules.
///
/// Runs on the merged record for both inserts and updates, so an update can
/// never produce a row that a create would have rejected.
pub(crate) fn validate_experiment(record: &Model, today: NaiveDate) -> AppResult<()> {
    if record.name.trim().is_empty() {
        return Err(validation_error!("name", "experiment name is required"));
    }

    if record.inoculation_date > today {
        return Err(validation_error!(
            "inoculation_date",
            "inoculation date cannot be in the future"
        ));
    }

    if !(0.0..=MAX_SPAWN_RATIO).contains(&record.spawn_ratio) {
        return Err(validation_error!(
            "spawn_ratio",
            format!("spawn ratio must be between 0 and {MAX_SPAWN_RATIO} percent")
        ));
    }

    if let Some(weight) = record.substrate_weight_kg {
        if !(0.0..=MAX_SUBSTRATE_WEIGHT_KG).contains(&weight) {
            return Err(validation_error!(
                "substrate_weight_kg",
                format!("substrate weight must be between 0 and {MAX_SUBSTRATE_WEIGHT_KG} kg")
            ));
        }
    }

    for (field, observed) in [
        ("colonization_date", record.colonization_date),
        ("first_pin_date", record.first_pin_date),
    ] {
        let Some(date) = observed else { continue };
        if date < record.inoculation_date {
            return Err(validation_error!(
                field,
                format!(
                    "{date} is earlier than the inoculation date {}",
                    record.inoculation_date
                )
            ));
        }
        if date > today {
            return Err(validation_error!(field, "date cannot be in the future"));
        }
    }

    if record.status != ExperimentStatus::Contaminated
        && (record.contamination_type.is_some() || record.contamination_notes.is_some())
    {
        return Err(validation_error!(
            "contamination_type",
            "contamination details can only be recorded on contaminated experiments"
        ));
    }

    Ok(())
}

/// Trim free text and collapse blank values to `None`.
fn normalize(mut record: Model) -> Model {
    record.name = record.name.trim().to_string();
    record.substrate_details = normalize_text(record.substrate_details);
    record.contamination_type = normalize_text(record.contamination_type);
    record.contamination_notes = normalize_text(record.contamination_notes);
    record.notes = normalize_text(record.notes);
    record
}

pub async fn create_experiment(
    db: &DatabaseConnection,
    data: ExperimentCreate,
) -> AppResult<Model> {
    let mut draft: ActiveModel = data.into();
    draft.id = Set(0);
    draft.created_at = Set(Utc::now());

    let record = normalize(draft.try_into_model()?);
    validate_experiment(&record, today())?;

    let mut row = record.into_active_model().reset_all();
    row.id = NotSet;
    let created = row.insert(db).await?;
    info!(
        experiment_id = created.id,
        name = %created.name,
        substrate = %created.substrate_type,
        "recorded new experiment"
    );

    Ok(created)
}

pub async fn get_experiment(db: &DatabaseConnection, id: i32) -> AppResult<Model> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("Experiment", id))
}

/// Experiments matching `condition` sorted on one column, ties by ascending id.
pub(crate) fn ordered(condition: Condition, column: Column, direction: Order) -> Select<Entity> {
    Entity::find()
        .filter(condition)
        .order_by(column, direction)
        .order_by_asc(Column::Id)
}

/// Experiments matching `filter`, newest inoculation first unless another
/// order is requested.
///
/// The name match folds case in Rust rather than in SQL, since SQLite's
/// `lower()` only folds ASCII letters.
pub async fn list_experiments(
    db: &DatabaseConnection,
    filter: &ExperimentFilter,
) -> AppResult<Vec<Model>> {
    let mut condition = Condition::all();

    if let Some(statuses) = filter.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Status.is_in(statuses.iter().copied()));
    }

    if let Some(substrates) = filter.substrate_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::SubstrateType.is_in(substrates.iter().copied()));
    }

    if let Some(from) = filter.inoculated_from {
        condition = condition.add(Column::InoculationDate.gte(from));
    }

    if let Some(to) = filter.inoculated_to {
        condition = condition.add(Column::InoculationDate.lte(to));
    }

    let (column, direction) = match filter.sort {
        ExperimentSort::InoculationDateDesc => (Column::InoculationDate, Order::Desc),
        ExperimentSort::InoculationDateAsc => (Column::InoculationDate, Order::Asc),
        ExperimentSort::CreatedAtDesc => (Column::CreatedAt, Order::Desc),
    };
    let mut experiments = ordered(condition, column, direction).all(db).await?;

    if let Some(term) = filter
        .name
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let term = term.to_lowercase();
        experiments.retain(|experiment| experiment.name.to_lowercase().contains(&term));
    }

    debug!(count = experiments.len(), "listed experiments");
    Ok(experiments)
}

/// Earliest harvest date recorded for an experiment.
async fn earliest_harvest_date(
    db: &DatabaseConnection,
    experiment_id: i32,
) -> AppResult<Option<NaiveDate>> {
    let first = harvests::Entity::find()
        .filter(harvests::Column::ExperimentId.eq(experiment_id))
        .order_by_asc(harvests::Column::HarvestDate)
        .one(db)
        .await?;

    Ok(first.map(|harvest| harvest.harvest_date))
}

/// Apply the supplied fields and persist, or reject without touching the row.
pub async fn update_experiment(
    db: &DatabaseConnection,
    id: i32,
    update_data: ExperimentUpdate,
) -> AppResult<Model> {
    let existing = get_experiment(db, id).await?;
    let merged = update_data.merge_into_activemodel(existing.clone().into_active_model())?;
    if !merged.is_changed() {
        return Ok(existing);
    }

    let candidate = normalize(merged.try_into_model()?);

    if !existing.status.can_transition_to(candidate.status) {
        return Err(validation_error!(
            "status",
            format!(
                "cannot change status from {} to {}",
                existing.status, candidate.status
            )
        ));
    }
    validate_experiment(&candidate, today())?;

    if candidate.inoculation_date > existing.inoculation_date {
        if let Some(first_harvest) = earliest_harvest_date(db, id).await? {
            if first_harvest < candidate.inoculation_date {
                return Err(validation_error!(
                    "inoculation_date",
                    format!(
                        "inoculation date {} is later than the first harvest on {first_harvest}",
                        candidate.inoculation_date
                    )
                ));
            }
        }
    }

    let updated = candidate.into_active_model().reset_all().update(db).await?;
    if updated.status != existing.status {
        info!(
            experiment_id = id,
            from = %existing.status,
            to = %updated.status,
            "experiment status changed"
        );
    }

    Ok(updated)
}

/// Delete an experiment together with its harvests in one transaction.
pub async fn delete_experiment(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    if Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(not_found!("Experiment", id));
    }

    let removed = harvests::Entity::delete_many()
        .filter(harvests::Column::ExperimentId.eq(id))
        .exec(&txn)
        .await?;
    Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        experiment_id = id,
        harvests_removed = removed.rows_affected,
        "deleted experiment"
    );

    Ok(())
}

pub async fn aggregate_stats(db: &DatabaseConnection) -> AppResult<ExperimentStats> {
    let total_count = Entity::find().count(db).await?;
    let contaminated_count = Entity::find()
        .filter(Column::Status.eq(ExperimentStatus::Contaminated))
        .count(db)
        .await?;
    let active_count = Entity::find()
        .filter(Column::Status.is_not_in([ExperimentStatus::Done, ExperimentStatus::Contaminated]))
        .count(db)
        .await?;

    Ok(ExperimentStats {
        total_count,
        active_count,
        contaminated_count,
        success_rate: metrics::success_rate(total_count, contaminated_count),
    })
}
