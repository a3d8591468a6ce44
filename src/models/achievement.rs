use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GameKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    #[serde(rename = "_id")]
    pub code: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub requirement: Requirement,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum Requirement {
    GamesPlayed { count: i64 },
    DistinctGames { count: i64 },
    /// Reaching `threshold` in the direction given by the game's score order.
    Score { game_type: GameKind, threshold: i64 },
}

impl Achievement {
    fn new(
        code: &str,
        name: &str,
        description: &str,
        points: i32,
        requirement: Requirement,
    ) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            points,
            requirement,
            created_at: Utc::now(),
        }
    }

    pub fn catalogue() -> Vec<Achievement> {
        use GameKind::*;
        use Requirement::*;

        vec![
            Self::new(
                "first_game",
                "First steps",
                "Submit your first score",
                5,
                GamesPlayed { count: 1 },
            ),
            Self::new(
                "regular",
                "Regular",
                "Submit 50 scores",
                20,
                GamesPlayed { count: 50 },
            ),
            Self::new(
                "veteran",
                "Veteran",
                "Submit 500 scores",
                50,
                GamesPlayed { count: 500 },
            ),
            Self::new(
                "explorer",
                "Explorer",
                "Play three different games",
                10,
                DistinctGames { count: 3 },
            ),
            Self::new(
                "completionist",
                "Completionist",
                "Play every game at least once",
                30,
                DistinctGames {
                    count: GameKind::count() as i64,
                },
            ),
            Self::new(
                "snake_100",
                "Long boi",
                "Score 100 in Snake",
                15,
                Score {
                    game_type: Snake,
                    threshold: 100,
                },
            ),
            Self::new(
                "tetris_10k",
                "Line clearer",
                "Score 10000 in Tetris",
                15,
                Score {
                    game_type: Tetris,
                    threshold: 10_000,
                },
            ),
            Self::new(
                "minesweeper_60",
                "Sweeper",
                "Clear Minesweeper in under 60 seconds",
                25,
                Score {
                    game_type: Minesweeper,
                    threshold: 60,
                },
            ),
            Self::new(
                "sudoku_300",
                "Number cruncher",
                "Solve a Sudoku in under 5 minutes",
                25,
                Score {
                    game_type: Sudoku,
                    threshold: 300,
                },
            ),
            Self::new(
                "breakout_1k",
                "Brick breaker",
                "Score 1000 in Breakout",
                15,
                Score {
                    game_type: Breakout,
                    threshold: 1_000,
                },
            ),
            Self::new(
                "pong_10",
                "Rally master",
                "Score 10 points in Pong",
                10,
                Score {
                    game_type: Pong,
                    threshold: 10,
                },
            ),
        ]
    }
}
