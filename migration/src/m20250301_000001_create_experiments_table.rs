use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Experiments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Experiments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Experiments::Name).text().not_null())
                    .col(ColumnDef::new(Experiments::SubstrateType).string().not_null())
                    .col(ColumnDef::new(Experiments::SubstrateDetails).text())
                    .col(
                        ColumnDef::new(Experiments::SpawnRatio)
                            .double()
                            .not_null()
                            .default(10.0),
                    )
                    .col(ColumnDef::new(Experiments::SubstrateWeightKg).double())
                    .col(ColumnDef::new(Experiments::ContainerType).string())
                    .col(ColumnDef::new(Experiments::InoculationDate).date().not_null())
                    .col(ColumnDef::new(Experiments::ColonizationDate).date())
                    .col(ColumnDef::new(Experiments::FirstPinDate).date())
                    .col(
                        ColumnDef::new(Experiments::Status)
                            .string()
                            .not_null()
                            .default("inoculating"),
                    )
                    .col(ColumnDef::new(Experiments::ContaminationType).text())
                    .col(ColumnDef::new(Experiments::ContaminationNotes).text())
                    .col(ColumnDef::new(Experiments::Notes).text())
                    .col(
                        ColumnDef::new(Experiments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // List views filter on status and sort by inoculation date
        manager
            .create_index(
                Index::create()
                    .name("idx_experiments_status")
                    .table(Experiments::Table)
                    .col(Experiments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_experiments_inoculation_date")
                    .table(Experiments::Table)
                    .col(Experiments::InoculationDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Experiments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Experiments {
    Table,
    Id,
    Name,
    SubstrateType,
    SubstrateDetails,
    SpawnRatio,
    SubstrateWeightKg,
    ContainerType,
    InoculationDate,
    ColonizationDate,
    FirstPinDate,
    Status,
    ContaminationType,
    ContaminationNotes,
    Notes,
    CreatedAt,
}
