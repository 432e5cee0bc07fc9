pub use sea_orm_migration::prelude::*;

mod m20260114_000001_initial;
mod m20260302_000001_add_broadcasts;
mod m20260418_000001_add_passport_grant_kind;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260114_000001_initial::Migration),
            Box::new(m20260302_000001_add_broadcasts::Migration),
            Box::new(m20260418_000001_add_passport_grant_kind::Migration),
        ]
    }
}
