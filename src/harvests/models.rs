use super::services;
use crate::experiments::models::ExperimentStatus;
use chrono::{DateTime, NaiveDate, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, Order, QueryOrder, QuerySelect};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "harvests")]
#[crudcrate(
    api_struct = "Harvest",
    name_singular = "harvest",
    name_plural = "harvests",
    description = "Each flush taken from an experiment. Only the quality notes change later.",
    fn_create = create_harvest,
    fn_get_all = get_all_harvests
)]
pub struct Model {
    #[sea_orm(primary_key)]
    #[crudcrate(primary_key, update_model = false, create_model = false, sortable)]
    pub id: i32,
    #[crudcrate(sortable, filterable, update_model = false)]
    pub experiment_id: i32,
    /// Assigned on insert: one past the highest flush of the experiment
    #[crudcrate(sortable, filterable, update_model = false, create_model = false)]
    pub flush_number: i32,
    #[crudcrate(sortable, update_model = false)]
    pub harvest_date: NaiveDate,
    #[crudcrate(sortable, update_model = false)]
    pub fresh_weight_grams: f64,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(fulltext)]
    pub quality_notes: Option<String>,
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
    #[sea_orm(
        belongs_to = "crate::experiments::models::Entity",
        from = "Column::ExperimentId",
        to = "crate::experiments::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Experiments,
}

impl Related<crate::experiments::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Experiments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Recording through `CRUDResource` applies the default harvest policy.
pub(super) async fn create_harvest(
    db: &DatabaseConnection,
    data: HarvestCreate,
) -> Result<Harvest, DbErr> {
    let created = services::create_harvest(db, data, HarvestPolicy::default()).await?;
    Ok(created.into())
}

pub(super) async fn get_all_harvests(
    db: &DatabaseConnection,
    condition: &Condition,
    order_column: Column,
    order_direction: Order,
    offset: u64,
    limit: u64,
) -> Result<Vec<HarvestList>, DbErr> {
    let models = Entity::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction)
        .order_by_asc(Column::HarvestDate)
        .order_by_asc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok(models.into_iter().map(HarvestList::from).collect())
}

/// Which experiments may still receive harvests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HarvestPolicy {
    /// Any experiment, whatever its status
    AllowAll,
    /// Everything except contaminated experiments
    #[default]
    ForbidContaminated,
    /// Only experiments that are neither done nor contaminated
    ForbidTerminal,
}

impl HarvestPolicy {
    pub fn permits(self, status: ExperimentStatus) -> bool {
        match self {
            HarvestPolicy::AllowAll => true,
            HarvestPolicy::ForbidContaminated => status != ExperimentStatus::Contaminated,
            HarvestPolicy::ForbidTerminal => status.is_active(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            HarvestPolicy::AllowAll => "allow_all",
            HarvestPolicy::ForbidContaminated => "forbid_contaminated",
            HarvestPolicy::ForbidTerminal => "forbid_terminal",
        }
    }
}

impl std::fmt::Display for HarvestPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HarvestPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow_all" => Ok(HarvestPolicy::AllowAll),
            "forbid_contaminated" => Ok(HarvestPolicy::ForbidContaminated),
            "forbid_terminal" => Ok(HarvestPolicy::ForbidTerminal),
            _ => Err(format!("'{s}' is not a valid value")),
        }
    }
}
