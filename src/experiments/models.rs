use super::services;
use chrono::{DateTime, NaiveDate, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, Order, QuerySelect};
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as};

/// Display and parsing through the database string value, so query strings,
/// JSON bodies and stored rows all agree on spelling.
macro_rules! text_enum_conversions {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&sea_orm::ActiveEnum::to_value(self))
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().to_lowercase();
                <Self as sea_orm::ActiveEnum>::try_from_value(&value)
                    .map_err(|_| format!("'{s}' is not a valid value"))
            }
        }
    };
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SubstrateType {
    #[sea_orm(string_value = "cardboard")]
    Cardboard,
    #[sea_orm(string_value = "coffee")]
    Coffee,
    #[sea_orm(string_value = "straw")]
    Straw,
    #[sea_orm(string_value = "sawdust")]
    Sawdust,
    #[sea_orm(string_value = "mix")]
    Mix,
    #[sea_orm(string_value = "other")]
    Other,
}

text_enum_conversions!(SubstrateType);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, ToSchema, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    #[sea_orm(string_value = "bucket")]
    Bucket,
    #[sea_orm(string_value = "bag")]
    Bag,
    #[sea_orm(string_value = "jar")]
    Jar,
    #[sea_orm(string_value = "other")]
    Other,
}

text_enum_conversions!(ContainerType);

/// Lifecycle stage of an experiment. Variants are declared in lifecycle
/// order, which `EnumIter` preserves.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    #[default]
    #[sea_orm(string_value = "inoculating")]
    Inoculating,
    #[sea_orm(string_value = "colonizing")]
    Colonizing,
    #[sea_orm(string_value = "pinning")]
    Pinning,
    #[sea_orm(string_value = "fruiting")]
    Fruiting,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "contaminated")]
    Contaminated,
}

text_enum_conversions!(ExperimentStatus);

impl ExperimentStatus {
    /// Done and contaminated experiments never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExperimentStatus::Done | ExperimentStatus::Contaminated)
    }

    /// Not yet finished and not lost to contamination.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Position along the growth path; contamination sits outside it.
    fn stage(self) -> Option<u8> {
        match self {
            ExperimentStatus::Inoculating => Some(0),
            ExperimentStatus::Colonizing => Some(1),
            ExperimentStatus::Pinning => Some(2),
            ExperimentStatus::Fruiting => Some(3),
            ExperimentStatus::Done => Some(4),
            ExperimentStatus::Contaminated => None,
        }
    }

    /// Whether an experiment currently in `self` may be moved to `next`.
    ///
    /// Growth stages only move forward (skipping is allowed), contamination
    /// can interrupt any non-terminal stage, and terminal stages are final.
    /// Re-stating the current status is always accepted.
    pub fn can_transition_to(self, next: ExperimentStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "experiments")]
#[crudcrate(
    api_struct = "Experiment",
    name_singular = "experiment",
    name_plural = "experiments",
    description = "Experiments record one grow: substrate, spawn, key dates and lifecycle status.",
    fn_create = create_experiment,
    fn_update = update_experiment,
    fn_get_all = get_all_experiments
)]
pub struct Model {
    #[sea_orm(primary_key)]
    #[crudcrate(primary_key, update_model = false, create_model = false, sortable)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    #[crudcrate(sortable, filterable, fulltext)]
    pub name: String,
    #[crudcrate(sortable, filterable, enum_field)]
    pub substrate_type: SubstrateType,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(filterable, fulltext)]
    pub substrate_details: Option<String>,
    #[crudcrate(sortable, on_create = DEFAULT_SPAWN_RATIO)]
    pub spawn_ratio: f64,
    #[crudcrate(sortable)]
    pub substrate_weight_kg: Option<f64>,
    pub container_type: Option<ContainerType>,
    #[crudcrate(sortable)]
    pub inoculation_date: NaiveDate,
    #[crudcrate(sortable)]
    pub colonization_date: Option<NaiveDate>,
    #[crudcrate(sortable)]
    pub first_pin_date: Option<NaiveDate>,
    #[crudcrate(sortable, filterable, enum_field, on_create = ExperimentStatus::Inoculating)]
    pub status: ExperimentStatus,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(filterable, fulltext, list_model = false)]
    pub contamination_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(fulltext, list_model = false)]
    pub contamination_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(fulltext, list_model = false)]
    pub notes: Option<String>,
    #[crudcrate(
        update_model = false,
        create_model = false,
        on_create = chrono::Utc::now(),
        sortable
    )]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::harvests::models::Entity")]
    Harvests,
}

impl Related<crate::harvests::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Harvests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const DEFAULT_SPAWN_RATIO: f64 = 10.0;

/// Field rules are enforced by the service layer; rejections surface here
/// as `DbErr::Custom`.
pub(super) async fn create_experiment(
    db: &DatabaseConnection,
    data: ExperimentCreate,
) -> Result<Experiment, DbErr> {
    let created = services::create_experiment(db, data).await?;
    Ok(created.into())
}

pub(super) async fn update_experiment(
    db: &DatabaseConnection,
    id: i32,
    update_data: ExperimentUpdate,
) -> Result<Experiment, DbErr> {
    let updated = services::update_experiment(db, id, update_data).await?;
    Ok(updated.into())
}

pub(super) async fn get_all_experiments(
    db: &DatabaseConnection,
    condition: &Condition,
    order_column: Column,
    order_direction: Order,
    offset: u64,
    limit: u64,
) -> Result<Vec<ExperimentList>, DbErr> {
    let models = services::ordered(condition.clone(), order_column, order_direction)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok(models.into_iter().map(ExperimentList::from).collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentSort {
    #[default]
    InoculationDateDesc,
    InoculationDateAsc,
    CreatedAtDesc,
}

/// Optional predicates for listing experiments; unset or empty means "any".
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExperimentFilter {
    /// Comma separated statuses, e.g. `colonizing,pinning`
    #[serde_as(as = "Option<StringWithSeparator::<CommaSeparator, ExperimentStatus>>")]
    #[param(value_type = Option<String>)]
    pub status: Option<Vec<ExperimentStatus>>,
    /// Comma separated substrate types
    #[serde_as(as = "Option<StringWithSeparator::<CommaSeparator, SubstrateType>>")]
    #[param(value_type = Option<String>)]
    pub substrate_type: Option<Vec<SubstrateType>>,
    /// Case-insensitive substring of the experiment name
    pub name: Option<String>,
    /// Inclusive lower bound on the inoculation date
    pub inoculated_from: Option<NaiveDate>,
    /// Inclusive upper bound on the inoculation date
    pub inoculated_to: Option<NaiveDate>,
    #[serde(default)]
    #[param(value_type = Option<ExperimentSort>)]
    pub sort: ExperimentSort,
}

/// Dashboard counters over the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExperimentStats {
    pub total_count: u64,
    pub active_count: u64,
    pub contaminated_count: u64,
    pub success_rate: f64,
}
