pub use sea_orm_migration::prelude::*;

mod m20261001_000001_add_games;
mod m20261001_000002_add_game_plays;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_add_games::Migration),
            Box::new(m20261001_000002_add_game_plays::Migration),
        ]
    }
}
