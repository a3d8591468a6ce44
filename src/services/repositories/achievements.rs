use mongodb::{
    bson::{self, doc, Document},
    error::Result,
    Collection, Database, IndexModel,
};

use crate::models::Achievement;

use super::{index, unique_index};

#[derive(Clone)]
pub struct AchievementsRepository {
    achievements: Collection<Achievement>,
    user_achievements: Collection<Document>,
}

impl AchievementsRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            achievements: database.collection("achievements"),
            user_achievements: database.collection("user_achievements"),
        }
    }

    /// Inserts missing achievements, leaving existing ones untouched.
    pub async fn seed_achievements(&self) -> Result<usize> {
        let mut inserted = 0;

        for achievement in Achievement::catalogue() {
            let mut document = bson::to_document(&achievement)?;
            document.remove("_id");

            let result = self
                .achievements
                .update_one(
                    doc! { "_id": achievement.code.as_str() },
                    doc! { "$setOnInsert": document },
                )
                .upsert(true)
                .await?;

            if result.upserted_id.is_some() {
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    pub async fn create_indexes(&self) -> Result<()> {
        self.user_achievements
            .create_indexes(user_achievement_indexes())
            .await?;

        self.achievements
            .create_indexes(achievement_indexes())
            .await?;

        Ok(())
    }
}

pub fn user_achievement_indexes() -> Vec<IndexModel> {
    vec![
        unique_index(doc! { "user_id": 1, "achievement_id": 1 }, "user_achievement"),
        index(doc! { "user_id": 1, "unlocked_at": -1 }, "recent_unlocks"),
    ]
}

pub fn achievement_indexes() -> Vec<IndexModel> {
    vec![index(
        doc! { "requirement.data.game_type": 1 },
        "achievements_by_game",
    )]
}
