use super::m20250301_000001_create_experiments_table::Experiments;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Harvests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Harvests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Harvests::ExperimentId).integer().not_null())
                    .col(ColumnDef::new(Harvests::FlushNumber).integer().not_null())
                    .col(ColumnDef::new(Harvests::HarvestDate).date().not_null())
                    .col(ColumnDef::new(Harvests::FreshWeightGrams).double().not_null())
                    .col(ColumnDef::new(Harvests::QualityNotes).text())
                    .col(
                        ColumnDef::new(Harvests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_harvests_experiment_id")
                            .from(Harvests::Table, Harvests::ExperimentId)
                            .to(Experiments::Table, Experiments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_harvests_experiment_id")
                    .table(Harvests::Table)
                    .col(Harvests::ExperimentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Harvests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Harvests {
    Table,
    Id,
    ExperimentId,
    FlushNumber,
    HarvestDate,
    FreshWeightGrams,
    QualityNotes,
    CreatedAt,
}
