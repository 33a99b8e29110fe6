#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_tables::Migration),
            Box::new(m20240101_000002_create_reference_tables::Migration),
            Box::new(m20240101_000003_create_assets_table::Migration),
            Box::new(m20240101_000004_create_asset_assignments_table::Migration),
            Box::new(m20240101_000005_create_asset_transfers_table::Migration),
            Box::new(m20240101_000006_create_audit_logs_table::Migration),
            Box::new(m20240101_000007_create_notifications_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().not_null())
                        .col(ColumnDef::new(Users::LastName).string().not_null())
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(ColumnDef::new(Users::DepartmentId).uuid().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::MfaEnabled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::MfaSecret).text().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .col(ColumnDef::new(Users::DeletedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserRoles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserRoles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserRoles::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserRoles::Role).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_roles_user_role")
                        .table(UserRoles::Table)
                        .col(UserRoles::UserId)
                        .col(UserRoles::Role)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefreshTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RefreshTokens::UserId).uuid().not_null())
                        .col(ColumnDef::new(RefreshTokens::TokenHash).string().not_null())
                        .col(
                            ColumnDef::new(RefreshTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RefreshTokens::RevokedAt).timestamp().null())
                        .col(
                            ColumnDef::new(RefreshTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_refresh_tokens_token_hash")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::TokenHash)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(UserRoles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        FirstName,
        LastName,
        Phone,
        DepartmentId,
        IsActive,
        MfaEnabled,
        MfaSecret,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum UserRoles {
        Table,
        Id,
        UserId,
        Role,
    }

    #[derive(DeriveIden)]
    pub(super) enum RefreshTokens {
        Table,
        Id,
        UserId,
        TokenHash,
        ExpiresAt,
        RevokedAt,
        CreatedAt,
    }
}

mod m20240101_000002_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Code).string().not_null())
                        .col(
                            ColumnDef::new(Categories::DepreciationRate)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Categories::UsefulLifeYears)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(Categories::SalvageValue).decimal().null())
                        .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_code")
                        .table(Categories::Table)
                        .col(Categories::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::Code).string().not_null())
                        .col(ColumnDef::new(Vendors::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vendors_code")
                        .table(Vendors::Table)
                        .col(Vendors::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(ColumnDef::new(Locations::Code).string().not_null())
                        .col(ColumnDef::new(Locations::Kind).string().null())
                        .col(ColumnDef::new(Locations::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_code")
                        .table(Locations::Table)
                        .col(Locations::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Departments::Name).string().not_null())
                        .col(ColumnDef::new(Departments::Code).string().not_null())
                        .col(
                            ColumnDef::new(Departments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_departments_code")
                        .table(Departments::Table)
                        .col(Departments::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Categories {
        Table,
        Id,
        Name,
        Code,
        DepreciationRate,
        UsefulLifeYears,
        SalvageValue,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Vendors {
        Table,
        Id,
        Name,
        Code,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Locations {
        Table,
        Id,
        Name,
        Code,
        Kind,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Departments {
        Table,
        Id,
        Name,
        Code,
        CreatedAt,
    }
}

mod m20240101_000003_create_assets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_assets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Assets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Assets::AssetTag).string().not_null())
                        .col(ColumnDef::new(Assets::Name).string().not_null())
                        .col(ColumnDef::new(Assets::Description).text().null())
                        .col(ColumnDef::new(Assets::SerialNumber).string().null())
                        .col(ColumnDef::new(Assets::Model).string().null())
                        .col(ColumnDef::new(Assets::Manufacturer).string().null())
                        .col(ColumnDef::new(Assets::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Assets::VendorId).uuid().null())
                        .col(ColumnDef::new(Assets::LocationId).uuid().null())
                        .col(ColumnDef::new(Assets::Status).string().not_null())
                        .col(ColumnDef::new(Assets::PurchaseDate).timestamp().not_null())
                        .col(ColumnDef::new(Assets::PurchaseCost).decimal().not_null())
                        .col(ColumnDef::new(Assets::CurrentValue).decimal().null())
                        .col(ColumnDef::new(Assets::SalvageValue).decimal().null())
                        .col(ColumnDef::new(Assets::WarrantyEndDate).timestamp().null())
                        .col(ColumnDef::new(Assets::Notes).text().null())
                        .col(ColumnDef::new(Assets::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Assets::UpdatedAt).timestamp().null())
                        .col(ColumnDef::new(Assets::DeletedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Tag and serial uniqueness spans soft-deleted rows on purpose:
            // a retired asset keeps its tag reserved.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_asset_tag")
                        .table(Assets::Table)
                        .col(Assets::AssetTag)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_assets_serial_number \
                     ON assets (serial_number) WHERE serial_number IS NOT NULL",
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_status")
                        .table(Assets::Table)
                        .col(Assets::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_category_id")
                        .table(Assets::Table)
                        .col(Assets::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Assets {
        Table,
        Id,
        AssetTag,
        Name,
        Description,
        SerialNumber,
        Model,
        Manufacturer,
        CategoryId,
        VendorId,
        LocationId,
        Status,
        PurchaseDate,
        PurchaseCost,
        CurrentValue,
        SalvageValue,
        WarrantyEndDate,
        Notes,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }
}

mod m20240101_000004_create_asset_assignments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_asset_assignments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssetAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssetAssignments::AssetId).uuid().not_null())
                        .col(
                            ColumnDef::new(AssetAssignments::AssignedToUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::AssignedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::AssignedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ExpectedReturnDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::AssignCondition)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::AssignConditionRating)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetAssignments::AssignNotes).text().null())
                        .col(
                            ColumnDef::new(AssetAssignments::AssignSignatureUrl)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::AssignSignatureHash)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnedToUserId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnCondition)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnConditionRating)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnPhotoUrls)
                                .json()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetAssignments::ReturnNotes).text().null())
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnSignatureUrl)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::ReturnSignatureHash)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(AssetAssignments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_asset_assignments_asset_id")
                        .table(AssetAssignments::Table)
                        .col(AssetAssignments::AssetId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_asset_assignments_assigned_to")
                        .table(AssetAssignments::Table)
                        .col(AssetAssignments::AssignedToUserId)
                        .to_owned(),
                )
                .await?;

            // Application code checks for an existing active assignment before
            // inserting; this index rejects the race the check cannot see.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_asset_assignments_one_active \
                     ON asset_assignments (asset_id) WHERE is_active",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AssetAssignments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AssetAssignments {
        Table,
        Id,
        AssetId,
        AssignedToUserId,
        AssignedByUserId,
        AssignedAt,
        ExpectedReturnDate,
        AssignCondition,
        AssignConditionRating,
        AssignNotes,
        AssignSignatureUrl,
        AssignSignatureHash,
        ReturnedAt,
        ReturnedToUserId,
        ReturnCondition,
        ReturnConditionRating,
        ReturnPhotoUrls,
        ReturnNotes,
        ReturnSignatureUrl,
        ReturnSignatureHash,
        IsActive,
        CreatedAt,
    }
}

mod m20240101_000005_create_asset_transfers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_asset_transfers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssetTransfers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetTransfers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssetTransfers::AssetId).uuid().not_null())
                        .col(ColumnDef::new(AssetTransfers::FromUserId).uuid().null())
                        .col(ColumnDef::new(AssetTransfers::ToUserId).uuid().not_null())
                        .col(
                            ColumnDef::new(AssetTransfers::RequestedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetTransfers::RequestedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetTransfers::TransferReason)
                                .text()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetTransfers::Status).string().not_null())
                        .col(
                            ColumnDef::new(AssetTransfers::ManagerApproverId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetTransfers::ManagerApprovedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetTransfers::ManagerNotes).text().null())
                        .col(
                            ColumnDef::new(AssetTransfers::AdminApproverId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetTransfers::AdminApprovedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetTransfers::AdminNotes).text().null())
                        .col(
                            ColumnDef::new(AssetTransfers::CompletedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AssetTransfers::RejectedByUserId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(AssetTransfers::RejectedAt).timestamp().null())
                        .col(
                            ColumnDef::new(AssetTransfers::RejectionReason)
                                .text()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_asset_transfers_asset_id")
                        .table(AssetTransfers::Table)
                        .col(AssetTransfers::AssetId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_asset_transfers_status")
                        .table(AssetTransfers::Table)
                        .col(AssetTransfers::Status)
                        .to_owned(),
                )
                .await?;

            // One in-flight transfer per asset; the database is the arbiter
            // when two requests race past the application-level check.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_asset_transfers_one_in_flight \
                     ON asset_transfers (asset_id) \
                     WHERE status IN ('pending', 'manager_approved')",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AssetTransfers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AssetTransfers {
        Table,
        Id,
        AssetId,
        FromUserId,
        ToUserId,
        RequestedByUserId,
        RequestedAt,
        TransferReason,
        Status,
        ManagerApproverId,
        ManagerApprovedAt,
        ManagerNotes,
        AdminApproverId,
        AdminApprovedAt,
        AdminNotes,
        CompletedAt,
        RejectedByUserId,
        RejectedAt,
        RejectionReason,
    }
}

mod m20240101_000006_create_audit_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_audit_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityId).uuid().not_null())
                        .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                        .col(ColumnDef::new(AuditLogs::ActorUserId).uuid().null())
                        .col(ColumnDef::new(AuditLogs::Details).json().null())
                        .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_audit_logs_entity")
                        .table(AuditLogs::Table)
                        .col(AuditLogs::EntityType)
                        .col(AuditLogs::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AuditLogs {
        Table,
        Id,
        EntityType,
        EntityId,
        Action,
        ActorUserId,
        Details,
        CreatedAt,
    }
}

mod m20240101_000007_create_notifications_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                        .col(ColumnDef::new(Notifications::Kind).string().not_null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Message).text().not_null())
                        .col(ColumnDef::new(Notifications::Data).json().null())
                        .col(ColumnDef::new(Notifications::ReadAt).timestamp().null())
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_id")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Notifications {
        Table,
        Id,
        UserId,
        Kind,
        Title,
        Message,
        Data,
        ReadAt,
        CreatedAt,
    }
}
