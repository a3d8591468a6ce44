use mongodb::{error::Result, Client};

use super::repositories::{achievements::AchievementsRepository, game::GamesRepository};

/// A best-effort startup step run once the collections are bound.
#[async_trait::async_trait]
pub trait Initializer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, client: &Client, database_name: &str) -> Result<()>;
}

/// Startup steps in the order they must run.
pub fn default_initializers() -> Vec<Box<dyn Initializer>> {
    vec![
        Box::new(SeedGameTypes),
        Box::new(GameScoreIndexes),
        Box::new(SeedAchievements),
        Box::new(AchievementIndexes),
    ]
}

pub struct SeedGameTypes;

#[async_trait::async_trait]
impl Initializer for SeedGameTypes {
    fn name(&self) -> &'static str {
        "game types"
    }

    async fn run(&self, client: &Client, database_name: &str) -> Result<()> {
        let repo = GamesRepository::new(&client.database(database_name));

        let inserted = repo.seed_game_types().await?;

        tracing::debug!("Seeded {inserted} new game types");

        Ok(())
    }
}

pub struct GameScoreIndexes;

#[async_trait::async_trait]
impl Initializer for GameScoreIndexes {
    fn name(&self) -> &'static str {
        "game score indexes"
    }

    async fn run(&self, client: &Client, database_name: &str) -> Result<()> {
        GamesRepository::new(&client.database(database_name))
            .create_score_indexes()
            .await
    }
}

pub struct SeedAchievements;

#[async_trait::async_trait]
impl Initializer for SeedAchievements {
    fn name(&self) -> &'static str {
        "achievements"
    }

    async fn run(&self, client: &Client, database_name: &str) -> Result<()> {
        let repo = AchievementsRepository::new(&client.database(database_name));

        let inserted = repo.seed_achievements().await?;

        tracing::debug!("Seeded {inserted} new achievements");

        Ok(())
    }
}

pub struct AchievementIndexes;

#[async_trait::async_trait]
impl Initializer for AchievementIndexes {
    fn name(&self) -> &'static str {
        "achievement indexes"
    }

    async fn run(&self, client: &Client, database_name: &str) -> Result<()> {
        AchievementsRepository::new(&client.database(database_name))
            .create_indexes()
            .await
    }
}
