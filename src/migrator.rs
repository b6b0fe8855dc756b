use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_collaborator_tables::Migration),
            Box::new(m20240101_000002_create_kitchen_orders_table::Migration),
            Box::new(m20240101_000003_create_kitchen_order_items_table::Migration),
            Box::new(m20240101_000004_create_kitchen_event_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_collaborator_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_collaborator_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Lookup tables owned by external collaborators. The core only
            // needs the columns required for referential validation and
            // response summaries.
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::MerchantId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OnlineOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OnlineOrders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OnlineOrders::MerchantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OnlineOrders::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(OnlineOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OnlineOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::ProductId).big_integer().null())
                        .col(
                            ColumnDef::new(OrderItems::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariants::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariants::Name).string().not_null())
                        .col(
                            ColumnDef::new(ProductVariants::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(KitchenStations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(KitchenStations::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(KitchenStations::MerchantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(KitchenStations::Name).string().not_null())
                        .col(
                            ColumnDef::new(KitchenStations::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(KitchenStations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenStations::UpdatedAt)
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
                        .name("idx_kitchen_stations_merchant_id")
                        .table(KitchenStations::Table)
                        .col(KitchenStations::MerchantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::MerchantId).big_integer().null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(
                            ColumnDef::new(Users::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(KitchenStations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OnlineOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        MerchantId,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OnlineOrders {
        Table,
        Id,
        MerchantId,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductVariants {
        Table,
        Id,
        ProductId,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum KitchenStations {
        Table,
        Id,
        MerchantId,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        MerchantId,
        Email,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_kitchen_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_kitchen_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(KitchenOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(KitchenOrders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::MerchantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(KitchenOrders::OrderId).big_integer().null())
                        .col(
                            ColumnDef::new(KitchenOrders::OnlineOrderId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::StationId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::Priority)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::BusinessStatus)
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::StartedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(KitchenOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(KitchenOrders::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Queue readers filter by merchant + status and order by priority.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_orders_merchant_id")
                        .table(KitchenOrders::Table)
                        .col(KitchenOrders::MerchantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_orders_business_status")
                        .table(KitchenOrders::Table)
                        .col(KitchenOrders::BusinessStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_orders_priority")
                        .table(KitchenOrders::Table)
                        .col(KitchenOrders::Priority)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_orders_created_at")
                        .table(KitchenOrders::Table)
                        .col(KitchenOrders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(KitchenOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum KitchenOrders {
        Table,
        Id,
        MerchantId,
        OrderId,
        OnlineOrderId,
        StationId,
        Priority,
        BusinessStatus,
        StartedAt,
        CompletedAt,
        Notes,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_kitchen_order_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_kitchen_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(KitchenOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(KitchenOrderItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::KitchenOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::OrderItemId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::VariantId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::PreparedQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::StartedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(KitchenOrderItems::Notes).text().null())
                        .col(
                            ColumnDef::new(KitchenOrderItems::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenOrderItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_kitchen_order_items_kitchen_order_id")
                                .from(KitchenOrderItems::Table, KitchenOrderItems::KitchenOrderId)
                                .to(KitchenOrders::Table, KitchenOrders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_order_items_kitchen_order_id")
                        .table(KitchenOrderItems::Table)
                        .col(KitchenOrderItems::KitchenOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_order_items_product_id")
                        .table(KitchenOrderItems::Table)
                        .col(KitchenOrderItems::ProductId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(KitchenOrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum KitchenOrderItems {
        Table,
        Id,
        KitchenOrderId,
        OrderItemId,
        ProductId,
        VariantId,
        Quantity,
        PreparedQuantity,
        StartedAt,
        CompletedAt,
        Notes,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum KitchenOrders {
        Table,
        Id,
    }
}

mod m20240101_000004_create_kitchen_event_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_kitchen_event_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(KitchenEventLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(KitchenEventLogs::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::KitchenOrderId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::KitchenOrderItemId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::StationId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::UserId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::EventType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::EventTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(KitchenEventLogs::Message).text().null())
                        .col(
                            ColumnDef::new(KitchenEventLogs::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitchenEventLogs::UpdatedAt)
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
                        .name("idx_kitchen_event_logs_kitchen_order_id")
                        .table(KitchenEventLogs::Table)
                        .col(KitchenEventLogs::KitchenOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_event_logs_event_type")
                        .table(KitchenEventLogs::Table)
                        .col(KitchenEventLogs::EventType)
                        .to_owned(),
                )
                .await?;

            // Default listing sorts by event time descending.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_kitchen_event_logs_event_time")
                        .table(KitchenEventLogs::Table)
                        .col(KitchenEventLogs::EventTime)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(KitchenEventLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum KitchenEventLogs {
        Table,
        Id,
        KitchenOrderId,
        KitchenOrderItemId,
        StationId,
        UserId,
        EventType,
        EventTime,
        Message,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}
