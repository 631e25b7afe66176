use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_tenancy_tables::Migration),
            Box::new(m20240301_000002_create_crm_tables::Migration),
            Box::new(m20240301_000003_create_work_order_tables::Migration),
            Box::new(m20240301_000004_create_inventory_tables::Migration),
            Box::new(m20240301_000005_create_ledger_and_content_tables::Migration),
        ]
    }
}

async fn create_single_column_index<T>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    column: T,
) -> Result<(), DbErr>
where
    T: Iden + Copy + 'static,
{
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(column)
                .to_owned(),
        )
        .await
}

mod m20240301_000001_create_tenancy_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_tenancy_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(ColumnDef::new(Companies::ContactEmail).string().null())
                        .col(ColumnDef::new(Companies::Phone).string().null())
                        .col(ColumnDef::new(Companies::Address).string().null())
                        .col(
                            ColumnDef::new(Companies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Companies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            super::create_single_column_index(
                manager,
                "idx_users_company_id",
                Users::Table,
                Users::CompanyId,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Companies {
        Table,
        Id,
        Name,
        ContactEmail,
        Phone,
        Address,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Users {
        Table,
        Id,
        CompanyId,
        Name,
        Email,
        Role,
        Phone,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_crm_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_crm_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Customers::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::ContactPerson).string().null())
                        .col(ColumnDef::new(Customers::Notes).text().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Locations::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Locations::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(ColumnDef::new(Locations::Address).string().null())
                        .col(ColumnDef::new(Locations::CustomerId).uuid().null())
                        .col(ColumnDef::new(Locations::ContactName).string().null())
                        .col(ColumnDef::new(Locations::ContactPhone).string().null())
                        .col(
                            ColumnDef::new(Locations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Locations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Assets::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Assets::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Assets::Name).string().not_null())
                        .col(ColumnDef::new(Assets::SerialNumber).string().null())
                        .col(ColumnDef::new(Assets::Model).string().null())
                        .col(ColumnDef::new(Assets::Manufacturer).string().null())
                        .col(ColumnDef::new(Assets::CustomerId).uuid().null())
                        .col(ColumnDef::new(Assets::LocationId).uuid().null())
                        .col(ColumnDef::new(Assets::Status).string().not_null())
                        .col(
                            ColumnDef::new(Assets::InstalledAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Assets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assets::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Activities::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Activities::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Activities::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Activities::Kind).string().not_null())
                        .col(ColumnDef::new(Activities::Subject).string().not_null())
                        .col(ColumnDef::new(Activities::Details).text().null())
                        .col(ColumnDef::new(Activities::CustomerId).uuid().null())
                        .col(ColumnDef::new(Activities::OpportunityId).uuid().null())
                        .col(ColumnDef::new(Activities::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(Activities::OwnerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Activities::DueAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Activities::Completed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Activities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Activities::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Opportunities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Opportunities::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Opportunities::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Opportunities::Title).string().not_null())
                        .col(ColumnDef::new(Opportunities::CustomerId).uuid().null())
                        .col(ColumnDef::new(Opportunities::Stage).string().not_null())
                        .col(
                            ColumnDef::new(Opportunities::ValueCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Opportunities::Probability).integer().null())
                        .col(
                            ColumnDef::new(Opportunities::ExpectedCloseAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Opportunities::OwnerId).uuid().null())
                        .col(ColumnDef::new(Opportunities::Notes).text().null())
                        .col(
                            ColumnDef::new(Opportunities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Opportunities::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Products::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::PriceCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceCallLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceCallLogs::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ServiceCallLogs::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(ServiceCallLogs::CallerName).string().not_null())
                        .col(ColumnDef::new(ServiceCallLogs::CallerPhone).string().null())
                        .col(ColumnDef::new(ServiceCallLogs::CustomerId).uuid().null())
                        .col(ColumnDef::new(ServiceCallLogs::AssetId).uuid().null())
                        .col(ColumnDef::new(ServiceCallLogs::Summary).string().not_null())
                        .col(ColumnDef::new(ServiceCallLogs::Details).text().null())
                        .col(ColumnDef::new(ServiceCallLogs::Priority).string().not_null())
                        .col(ColumnDef::new(ServiceCallLogs::Status).string().not_null())
                        .col(ColumnDef::new(ServiceCallLogs::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(ServiceCallLogs::LoggedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(ServiceCallLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceCallLogs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            super::create_single_column_index(
                manager,
                "idx_customers_company_id",
                Customers::Table,
                Customers::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_locations_company_id",
                Locations::Table,
                Locations::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_assets_company_id",
                Assets::Table,
                Assets::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_activities_company_id",
                Activities::Table,
                Activities::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_opportunities_company_id",
                Opportunities::Table,
                Opportunities::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_products_company_id",
                Products::Table,
                Products::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_service_call_logs_company_id",
                ServiceCallLogs::Table,
                ServiceCallLogs::CompanyId,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceCallLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Opportunities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Activities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Customers {
        Table,
        Id,
        CompanyId,
        Name,
        Email,
        Phone,
        Address,
        ContactPerson,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Locations {
        Table,
        Id,
        CompanyId,
        Name,
        Address,
        CustomerId,
        ContactName,
        ContactPhone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Assets {
        Table,
        Id,
        CompanyId,
        Name,
        SerialNumber,
        Model,
        Manufacturer,
        CustomerId,
        LocationId,
        Status,
        InstalledAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Activities {
        Table,
        Id,
        CompanyId,
        Kind,
        Subject,
        Details,
        CustomerId,
        OpportunityId,
        WorkOrderId,
        OwnerId,
        DueAt,
        Completed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Opportunities {
        Table,
        Id,
        CompanyId,
        Title,
        CustomerId,
        Stage,
        ValueCents,
        Probability,
        ExpectedCloseAt,
        OwnerId,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Products {
        Table,
        Id,
        CompanyId,
        Name,
        Sku,
        Description,
        Category,
        PriceCents,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ServiceCallLogs {
        Table,
        Id,
        CompanyId,
        CallerName,
        CallerPhone,
        CustomerId,
        AssetId,
        Summary,
        Details,
        Priority,
        Status,
        WorkOrderId,
        LoggedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_work_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_work_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(WorkOrders::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(WorkOrders::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(WorkOrders::Title).string().not_null())
                        .col(ColumnDef::new(WorkOrders::Description).text().null())
                        .col(ColumnDef::new(WorkOrders::CustomerId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::AssetId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::LocationId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::Status).string().not_null())
                        .col(ColumnDef::new(WorkOrders::Priority).string().not_null())
                        .col(ColumnDef::new(WorkOrders::AssignedTo).uuid().null())
                        .col(ColumnDef::new(WorkOrders::Notes).text().null())
                        .col(ColumnDef::new(WorkOrders::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(WorkOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AllocatedParts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AllocatedParts::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AllocatedParts::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(AllocatedParts::WorkOrderId).uuid().not_null())
                        .col(ColumnDef::new(AllocatedParts::SparePartId).uuid().null())
                        .col(ColumnDef::new(AllocatedParts::Name).string().not_null())
                        .col(ColumnDef::new(AllocatedParts::PartNumber).string().null())
                        .col(
                            ColumnDef::new(AllocatedParts::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(AllocatedParts::Status).string().not_null())
                        .col(ColumnDef::new(AllocatedParts::RequestedBy).uuid().null())
                        .col(ColumnDef::new(AllocatedParts::RequestedByName).string().null())
                        .col(ColumnDef::new(AllocatedParts::VerifiedBy).string().null())
                        .col(ColumnDef::new(AllocatedParts::VerifiedById).uuid().null())
                        .col(
                            ColumnDef::new(AllocatedParts::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(AllocatedParts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AllocatedParts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            super::create_single_column_index(
                manager,
                "idx_work_orders_company_id",
                WorkOrders::Table,
                WorkOrders::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_allocated_parts_work_order_id",
                AllocatedParts::Table,
                AllocatedParts::WorkOrderId,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AllocatedParts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum WorkOrders {
        Table,
        Id,
        CompanyId,
        Title,
        Description,
        CustomerId,
        AssetId,
        LocationId,
        Status,
        Priority,
        AssignedTo,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        CompletedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum AllocatedParts {
        Table,
        Id,
        CompanyId,
        WorkOrderId,
        SparePartId,
        Name,
        PartNumber,
        Quantity,
        Status,
        RequestedBy,
        RequestedByName,
        VerifiedBy,
        VerifiedById,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_inventory_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SpareParts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SpareParts::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(SpareParts::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(SpareParts::Name).string().not_null())
                        .col(ColumnDef::new(SpareParts::PartNumber).string().null())
                        .col(ColumnDef::new(SpareParts::Description).text().null())
                        .col(
                            ColumnDef::new(SpareParts::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SpareParts::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SpareParts::Location).string().not_null())
                        .col(ColumnDef::new(SpareParts::UnitCostCents).big_integer().null())
                        .col(
                            ColumnDef::new(SpareParts::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(SpareParts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SpareParts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FacilityStock::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FacilityStock::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(FacilityStock::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(FacilityStock::SparePartId).uuid().not_null())
                        .col(ColumnDef::new(FacilityStock::PartName).string().not_null())
                        .col(
                            ColumnDef::new(FacilityStock::DestinationKind)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FacilityStock::DestinationId).uuid().not_null())
                        .col(
                            ColumnDef::new(FacilityStock::DestinationName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FacilityStock::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(FacilityStock::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(FacilityStock::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FacilityStock::UpdatedAt)
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
                        .name("idx_facility_stock_destination")
                        .table(FacilityStock::Table)
                        .col(FacilityStock::CompanyId)
                        .col(FacilityStock::SparePartId)
                        .col(FacilityStock::DestinationKind)
                        .col(FacilityStock::DestinationId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TransferLog::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TransferLog::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(TransferLog::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(TransferLog::SparePartId).uuid().not_null())
                        .col(ColumnDef::new(TransferLog::PartName).string().not_null())
                        .col(ColumnDef::new(TransferLog::Kind).string().not_null())
                        .col(ColumnDef::new(TransferLog::Quantity).integer().not_null())
                        .col(ColumnDef::new(TransferLog::Source).string().not_null())
                        .col(ColumnDef::new(TransferLog::DestinationKind).string().null())
                        .col(ColumnDef::new(TransferLog::DestinationId).uuid().null())
                        .col(ColumnDef::new(TransferLog::DestinationName).string().null())
                        .col(ColumnDef::new(TransferLog::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(TransferLog::Note).text().null())
                        .col(ColumnDef::new(TransferLog::PerformedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(TransferLog::PerformedByName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferLog::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            super::create_single_column_index(
                manager,
                "idx_spare_parts_company_id",
                SpareParts::Table,
                SpareParts::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_transfer_log_spare_part_id",
                TransferLog::Table,
                TransferLog::SparePartId,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransferLog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FacilityStock::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SpareParts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum SpareParts {
        Table,
        Id,
        CompanyId,
        Name,
        PartNumber,
        Description,
        Quantity,
        MinQuantity,
        Location,
        UnitCostCents,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum FacilityStock {
        Table,
        Id,
        CompanyId,
        SparePartId,
        PartName,
        DestinationKind,
        DestinationId,
        DestinationName,
        Quantity,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum TransferLog {
        Table,
        Id,
        CompanyId,
        SparePartId,
        PartName,
        Kind,
        Quantity,
        Source,
        DestinationKind,
        DestinationId,
        DestinationName,
        WorkOrderId,
        Note,
        PerformedBy,
        PerformedByName,
        CreatedAt,
    }
}

mod m20240301_000005_create_ledger_and_content_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_ledger_and_content_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Transactions::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::Reference).string().null())
                        .col(ColumnDef::new(Transactions::Description).string().not_null())
                        .col(ColumnDef::new(Transactions::CustomerId).uuid().null())
                        .col(ColumnDef::new(Transactions::WorkOrderId).uuid().null())
                        .col(
                            ColumnDef::new(Transactions::AmountCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::PaidCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Transactions::Status).string().not_null())
                        .col(
                            ColumnDef::new(Transactions::TransactionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifications::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Notifications::UserId).uuid().null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Message).text().not_null())
                        .col(ColumnDef::new(Notifications::Link).string().null())
                        .col(
                            ColumnDef::new(Notifications::Read)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::ReadAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Resources::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Resources::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Resources::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Resources::Title).string().not_null())
                        .col(ColumnDef::new(Resources::Description).text().null())
                        .col(ColumnDef::new(Resources::Category).string().null())
                        .col(ColumnDef::new(Resources::FileName).string().null())
                        .col(ColumnDef::new(Resources::ContentType).string().null())
                        .col(ColumnDef::new(Resources::SizeBytes).big_integer().null())
                        .col(ColumnDef::new(Resources::StorageKey).string().null())
                        .col(ColumnDef::new(Resources::DownloadUrl).string().null())
                        .col(ColumnDef::new(Resources::Analysis).json().null())
                        .col(ColumnDef::new(Resources::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Resources::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Resources::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            super::create_single_column_index(
                manager,
                "idx_transactions_company_id",
                Transactions::Table,
                Transactions::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_notifications_company_id",
                Notifications::Table,
                Notifications::CompanyId,
            )
            .await?;
            super::create_single_column_index(
                manager,
                "idx_resources_company_id",
                Resources::Table,
                Resources::CompanyId,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Resources::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Transactions {
        Table,
        Id,
        CompanyId,
        Reference,
        Description,
        CustomerId,
        WorkOrderId,
        AmountCents,
        PaidCents,
        Status,
        TransactionDate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Notifications {
        Table,
        Id,
        CompanyId,
        UserId,
        Title,
        Message,
        Link,
        Read,
        ReadAt,
        CreatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Resources {
        Table,
        Id,
        CompanyId,
        Title,
        Description,
        Category,
        FileName,
        ContentType,
        SizeBytes,
        StorageKey,
        DownloadUrl,
        Analysis,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}
