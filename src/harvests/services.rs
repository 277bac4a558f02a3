use super::models::{
    ActiveModel, Column, Entity, HarvestCreate, HarvestPolicy, HarvestUpdate, Model,
};
use crate::analytics::metrics::flush_after;
use crate::common::errors::AppResult;
use crate::common::utils::{normalize_text, today};
use crate::experiments::services::get_experiment;
use crate::{not_found, validation_error};
use chrono::Utc;
use crudcrate::traits::MergeIntoActiveModel;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use tracing::info;

/// Record a flush against an existing experiment.
///
/// The flush number is one past the highest flush already recorded for the
/// experiment.
pub async fn create_harvest(
    db: &DatabaseConnection,
    input: HarvestCreate,
    policy: HarvestPolicy,
) -> AppResult<Model> {
    let experiment = get_experiment(db, input.experiment_id).await?;

    if !policy.permits(experiment.status) {
        return Err(validation_error!(
            "experiment_id",
            format!(
                "harvests cannot be recorded for {} experiments (policy {policy})",
                experiment.status
            )
        ));
    }

    // Written as a negation so NaN is rejected too
    if !(input.fresh_weight_grams > 0.0) {
        return Err(validation_error!(
            "fresh_weight_grams",
            "fresh weight must be greater than zero"
        ));
    }

    if input.harvest_date < experiment.inoculation_date {
        return Err(validation_error!(
            "harvest_date",
            format!(
                "harvest date {} is earlier than the inoculation date {}",
                input.harvest_date, experiment.inoculation_date
            )
        ));
    }

    if input.harvest_date > today() {
        return Err(validation_error!(
            "harvest_date",
            "harvest date cannot be in the future"
        ));
    }

    let flush_number = next_flush_number(db, experiment.id).await?;

    let created = ActiveModel {
        id: NotSet,
        experiment_id: Set(experiment.id),
        flush_number: Set(flush_number),
        harvest_date: Set(input.harvest_date),
        fresh_weight_grams: Set(input.fresh_weight_grams),
        quality_notes: Set(normalize_text(input.quality_notes)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(
        harvest_id = created.id,
        experiment_id = created.experiment_id,
        flush = created.flush_number,
        grams = created.fresh_weight_grams,
        "recorded harvest"
    );

    Ok(created)
}

/// Flush number the next harvest of an experiment receives.
pub async fn next_flush_number(db: &DatabaseConnection, experiment_id: i32) -> AppResult<i32> {
    let latest = Entity::find()
        .filter(Column::ExperimentId.eq(experiment_id))
        .order_by_desc(Column::FlushNumber)
        .one(db)
        .await?;

    flush_after(latest.map(|harvest| harvest.flush_number)).ok_or_else(|| {
        validation_error!(
            "flush_number",
            "no further flush numbers are available for this experiment"
        )
    })
}

pub async fn get_harvest(db: &DatabaseConnection, id: i32) -> AppResult<Model> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("Harvest", id))
}

/// Harvests of one experiment by flush, then harvest date.
pub async fn list_harvests(db: &DatabaseConnection, experiment_id: i32) -> AppResult<Vec<Model>> {
    get_experiment(db, experiment_id).await?;

    Ok(Entity::find()
        .filter(Column::ExperimentId.eq(experiment_id))
        .order_by_asc(Column::FlushNumber)
        .order_by_asc(Column::HarvestDate)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn update_harvest_notes(
    db: &DatabaseConnection,
    id: i32,
    changes: HarvestUpdate,
) -> AppResult<Model> {
    let existing = get_harvest(db, id).await?.into_active_model();
    let mut harvest = changes.merge_into_activemodel(existing)?;
    if let Some(notes) = harvest.quality_notes.take() {
        harvest.quality_notes = Set(normalize_text(notes));
    }

    Ok(harvest.update(db).await?)
}

pub async fn delete_harvest(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found!("Harvest", id));
    }

    info!(harvest_id = id, "deleted harvest");
    Ok(())
}
