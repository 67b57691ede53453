use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_recipe_tables::Migration),
            Box::new(m20240301_000003_create_inventory_lots_table::Migration),
            Box::new(m20240301_000004_create_event_log_tables::Migration),
            Box::new(m20240301_000005_create_stocktake_tables::Migration),
            Box::new(m20240301_000006_create_audit_log_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // items - matches entities/item.rs
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::ItemId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::ItemType).string().not_null())
                        .col(ColumnDef::new(Items::BaseUnit).string().not_null())
                        .col(ColumnDef::new(Items::ShelfLifeDays).integer().null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // locations - matches entities/location.rs
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::LocationId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Locations::StoreId).big_integer().not_null())
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(
                            ColumnDef::new(Locations::IsSalesFloor)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_store_id")
                        .table(Locations::Table)
                        .col(Locations::StoreId)
                        .to_owned(),
                )
                .await?;

            // store_item_settings - matches entities/store_item_setting.rs
            manager
                .create_table(
                    Table::create()
                        .table(StoreItemSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreItemSettings::SettingId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreItemSettings::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreItemSettings::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreItemSettings::DefaultLocationId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StoreItemSettings::ParLevel)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_store_item_settings_store_item")
                        .table(StoreItemSettings::Table)
                        .col(StoreItemSettings::StoreId)
                        .col(StoreItemSettings::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // unit_conversions - matches entities/unit_conversion.rs
            manager
                .create_table(
                    Table::create()
                        .table(UnitConversions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UnitConversions::ConversionId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnitConversions::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UnitConversions::UnitName).string().not_null())
                        .col(ColumnDef::new(UnitConversions::Factor).double().not_null())
                        .col(
                            ColumnDef::new(UnitConversions::IsDefaultDisplay)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_unit_conversions_item_unit")
                        .table(UnitConversions::Table)
                        .col(UnitConversions::ItemId)
                        .col(UnitConversions::UnitName)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UnitConversions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoreItemSettings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        ItemId,
        Name,
        ItemType,
        BaseUnit,
        ShelfLifeDays,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Locations {
        Table,
        LocationId,
        StoreId,
        Name,
        IsSalesFloor,
    }

    #[derive(DeriveIden)]
    enum StoreItemSettings {
        Table,
        SettingId,
        StoreId,
        ItemId,
        DefaultLocationId,
        ParLevel,
    }

    #[derive(DeriveIden)]
    enum UnitConversions {
        Table,
        ConversionId,
        ItemId,
        UnitName,
        Factor,
        IsDefaultDisplay,
    }
}

mod m20240301_000002_create_recipe_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_recipe_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // recipes - matches entities/recipe.rs
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Recipes::RecipeId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Recipes::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(Recipes::YieldQuantity).double().not_null())
                        .col(ColumnDef::new(Recipes::YieldUnitId).big_integer().null())
                        .col(ColumnDef::new(Recipes::Instructions).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipes_item_id")
                        .table(Recipes::Table)
                        .col(Recipes::ItemId)
                        .to_owned(),
                )
                .await?;

            // recipe_ingredients - matches entities/recipe_ingredient.rs
            manager
                .create_table(
                    Table::create()
                        .table(RecipeIngredients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecipeIngredients::RecipeIngredientId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::RecipeId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::IngredientItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::QuantityRequired)
                                .double()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_ingredients_recipe_id")
                        .table(RecipeIngredients::Table)
                        .col(RecipeIngredients::RecipeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_ingredients_item_id")
                        .table(RecipeIngredients::Table)
                        .col(RecipeIngredients::IngredientItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Recipes {
        Table,
        RecipeId,
        ItemId,
        YieldQuantity,
        YieldUnitId,
        Instructions,
    }

    #[derive(DeriveIden)]
    enum RecipeIngredients {
        Table,
        RecipeIngredientId,
        RecipeId,
        IngredientItemId,
        QuantityRequired,
    }
}

mod m20240301_000003_create_inventory_lots_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_inventory_lots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // inventory_lots - matches entities/inventory_lot.rs
            manager
                .create_table(
                    Table::create()
                        .table(InventoryLots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryLots::LotId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLots::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryLots::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(InventoryLots::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLots::Quantity)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryLots::ExpirationDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLots::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_lots_store_item")
                        .table(InventoryLots::Table)
                        .col(InventoryLots::StoreId)
                        .col(InventoryLots::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_lots_location")
                        .table(InventoryLots::Table)
                        .col(InventoryLots::LocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryLots::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryLots {
        Table,
        LotId,
        StoreId,
        ItemId,
        LocationId,
        Quantity,
        ExpirationDate,
        CreatedAt,
    }
}

mod m20240301_000004_create_event_log_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_event_log_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // receiving_events - matches entities/receiving_event.rs
            manager
                .create_table(
                    Table::create()
                        .table(ReceivingEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceivingEvents::ReceivingId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingEvents::TransactionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingEvents::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingEvents::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReceivingEvents::Quantity).double().not_null())
                        .col(
                            ColumnDef::new(ReceivingEvents::UnitCost)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingEvents::ReceivedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receiving_events_store_item_time")
                        .table(ReceivingEvents::Table)
                        .col(ReceivingEvents::StoreId)
                        .col(ReceivingEvents::ItemId)
                        .col(ReceivingEvents::ReceivedAt)
                        .to_owned(),
                )
                .await?;

            // production_events - matches entities/production_event.rs
            manager
                .create_table(
                    Table::create()
                        .table(ProductionEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionEvents::ProductionId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionEvents::TransactionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionEvents::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionEvents::RecipeId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionEvents::QuantityMade)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionEvents::UnitType).string().not_null())
                        .col(
                            ColumnDef::new(ProductionEvents::TargetLocationId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionEvents::ProducedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_events_store_recipe_time")
                        .table(ProductionEvents::Table)
                        .col(ProductionEvents::StoreId)
                        .col(ProductionEvents::RecipeId)
                        .col(ProductionEvents::ProducedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionEvents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReceivingEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReceivingEvents {
        Table,
        ReceivingId,
        TransactionId,
        StoreId,
        ItemId,
        Quantity,
        UnitCost,
        ReceivedAt,
    }

    #[derive(DeriveIden)]
    enum ProductionEvents {
        Table,
        ProductionId,
        TransactionId,
        StoreId,
        RecipeId,
        QuantityMade,
        UnitType,
        TargetLocationId,
        ProducedAt,
    }
}

mod m20240301_000005_create_stocktake_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_stocktake_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // stocktake_sessions - matches entities/stocktake_session.rs
            manager
                .create_table(
                    Table::create()
                        .table(StocktakeSessions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StocktakeSessions::SessionId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeSessions::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StocktakeSessions::Status).string().not_null())
                        .col(
                            ColumnDef::new(StocktakeSessions::SessionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeSessions::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeSessions::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stocktake_sessions_store_status")
                        .table(StocktakeSessions::Table)
                        .col(StocktakeSessions::StoreId)
                        .col(StocktakeSessions::Status)
                        .to_owned(),
                )
                .await?;

            // stocktake_records - matches entities/stocktake_record.rs
            manager
                .create_table(
                    Table::create()
                        .table(StocktakeRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StocktakeRecords::RecordId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeRecords::SessionId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeRecords::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeRecords::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StocktakeRecords::QuantityCounted)
                                .double()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One count per item/location per session; re-submission overwrites
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stocktake_records_session_item_location")
                        .table(StocktakeRecords::Table)
                        .col(StocktakeRecords::SessionId)
                        .col(StocktakeRecords::ItemId)
                        .col(StocktakeRecords::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StocktakeRecords::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StocktakeSessions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StocktakeSessions {
        Table,
        SessionId,
        StoreId,
        Status,
        SessionType,
        StartedAt,
        CompletedAt,
    }

    #[derive(DeriveIden)]
    enum StocktakeRecords {
        Table,
        RecordId,
        SessionId,
        ItemId,
        LocationId,
        QuantityCounted,
    }
}

mod m20240301_000006_create_audit_log_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_audit_log_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // variance_logs - matches entities/variance_log.rs
            manager
                .create_table(
                    Table::create()
                        .table(VarianceLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VarianceLogs::VarianceId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VarianceLogs::StoreId).big_integer().not_null())
                        .col(ColumnDef::new(VarianceLogs::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(VarianceLogs::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VarianceLogs::ExpectedQuantity)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VarianceLogs::ActualQuantity)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VarianceLogs::Variance).double().not_null())
                        .col(
                            ColumnDef::new(VarianceLogs::RecordedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variance_logs_store_item")
                        .table(VarianceLogs::Table)
                        .col(VarianceLogs::StoreId)
                        .col(VarianceLogs::ItemId)
                        .to_owned(),
                )
                .await?;

            // expired_item_logs - matches entities/expired_item_log.rs
            manager
                .create_table(
                    Table::create()
                        .table(ExpiredItemLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ExpiredItemLogs::DisposalId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExpiredItemLogs::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ExpiredItemLogs::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(ExpiredItemLogs::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ExpiredItemLogs::Quantity).double().not_null())
                        .col(
                            ColumnDef::new(ExpiredItemLogs::ExpirationDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ExpiredItemLogs::Notes).string().null())
                        .col(
                            ColumnDef::new(ExpiredItemLogs::DisposedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_expired_item_logs_store_item")
                        .table(ExpiredItemLogs::Table)
                        .col(ExpiredItemLogs::StoreId)
                        .col(ExpiredItemLogs::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ExpiredItemLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VarianceLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VarianceLogs {
        Table,
        VarianceId,
        StoreId,
        ItemId,
        LocationId,
        ExpectedQuantity,
        ActualQuantity,
        Variance,
        RecordedAt,
    }

    #[derive(DeriveIden)]
    enum ExpiredItemLogs {
        Table,
        DisposalId,
        StoreId,
        ItemId,
        LocationId,
        Quantity,
        ExpirationDate,
        Notes,
        DisposedAt,
    }
}
