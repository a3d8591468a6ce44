mod achievement;

pub use achievement::{Achievement, Requirement};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

#[derive(
    Debug, Serialize, Deserialize, EnumIter, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameKind {
    Snake,
    Tetris,
    Minesweeper,
    Sudoku,
    Breakout,
    Pong,
}

impl GameKind {
    pub fn name(&self) -> &'static str {
        match self {
            GameKind::Snake => "Snake",
            GameKind::Tetris => "Tetris",
            GameKind::Minesweeper => "Minesweeper",
            GameKind::Sudoku => "Sudoku",
            GameKind::Breakout => "Breakout",
            GameKind::Pong => "Pong",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameKind::Snake => "Eat, grow and don't bite your own tail",
            GameKind::Tetris => "Clear lines before the well fills up",
            GameKind::Minesweeper => "Flag every mine as fast as you can",
            GameKind::Sudoku => "Fill the grid, fastest solve wins",
            GameKind::Breakout => "Break every brick with the ball",
            GameKind::Pong => "Rally against the machine",
        }
    }

    /// Timed games rank the smallest score first.
    pub fn score_order(&self) -> ScoreOrder {
        match self {
            GameKind::Minesweeper | GameKind::Sudoku => ScoreOrder::LowerIsBetter,
            GameKind::Snake | GameKind::Tetris | GameKind::Breakout | GameKind::Pong => {
                ScoreOrder::HigherIsBetter
            }
        }
    }

    pub fn count() -> usize {
        Self::iter().count()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameType {
    #[serde(rename = "_id")]
    pub id: GameKind,
    pub name: String,
    pub description: String,
    pub score_order: ScoreOrder,
    pub created_at: DateTime<Utc>,
}

impl GameType {
    pub fn catalogue() -> Vec<GameType> {
        GameKind::iter().map(GameType::from).collect()
    }
}

impl From<GameKind> for GameType {
    fn from(kind: GameKind) -> Self {
        Self {
            id: kind,
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            score_order: kind.score_order(),
            created_at: Utc::now(),
        }
    }
}
