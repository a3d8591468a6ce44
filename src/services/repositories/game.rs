use mongodb::{
    bson::{self, doc, Document},
    error::Result,
    Collection, Database, IndexModel,
};

use crate::models::GameType;

use super::index;

#[derive(Clone)]
pub struct GamesRepository {
    game_types: Collection<GameType>,
    scores: Collection<Document>,
}

impl GamesRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            game_types: database.collection("game_types"),
            scores: database.collection("scores"),
        }
    }

    /// Inserts missing game types, leaving existing ones untouched.
    pub async fn seed_game_types(&self) -> Result<usize> {
        let mut inserted = 0;

        for game_type in GameType::catalogue() {
            let mut document = bson::to_document(&game_type)?;
            document.remove("_id");

            let result = self
                .game_types
                .update_one(
                    doc! { "_id": game_type.id.to_string() },
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

    pub async fn create_score_indexes(&self) -> Result<()> {
        self.scores.create_indexes(score_indexes()).await?;

        Ok(())
    }
}

pub fn score_indexes() -> Vec<IndexModel> {
    vec![
        index(doc! { "game_type": 1, "score": -1 }, "leaderboard"),
        index(doc! { "user_id": 1, "game_type": 1 }, "user_scores"),
        index(doc! { "created_at": -1 }, "recent_scores"),
    ]
}
