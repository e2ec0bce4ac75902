use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::GameError;

pub type PlayRecordId = Uuid;

/// A fruit on the spinning grid. Serialized as its emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Symbol {
    #[serde(rename = "🍎")]
    Apple,
    #[serde(rename = "🍌")]
    Banana,
    #[serde(rename = "🍒")]
    Cherry,
    #[serde(rename = "🍇")]
    Grapes,
    #[serde(rename = "🍋")]
    Lemon,
    #[serde(rename = "🍊")]
    Orange,
    #[serde(rename = "🍑")]
    Peach,
    #[serde(rename = "🍓")]
    Strawberry,
    #[serde(rename = "🥝")]
    Kiwi,
}

impl Symbol {
    pub const ALL: [Symbol; 9] = [
        Symbol::Apple,
        Symbol::Banana,
        Symbol::Cherry,
        Symbol::Grapes,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Peach,
        Symbol::Strawberry,
        Symbol::Kiwi,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Apple => "🍎",
            Symbol::Banana => "🍌",
            Symbol::Cherry => "🍒",
            Symbol::Grapes => "🍇",
            Symbol::Lemon => "🍋",
            Symbol::Orange => "🍊",
            Symbol::Peach => "🍑",
            Symbol::Strawberry => "🍓",
            Symbol::Kiwi => "🥝",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

/// Square matrix of symbols produced by a single spin.
///
/// A grid can only be built through [`Grid::from_rows`], which rejects empty
/// or ragged input, so every cell of a `Grid` is populated. There is no way
/// to change a cell once the grid exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Symbol>>", into = "Vec<Vec<Symbol>>")]
pub struct Grid {
    rows: Vec<Vec<Symbol>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> Result<Self, GameError> {
        let size = rows.len();
        if size == 0 {
            return Err(GameError::InvalidGrid {
                reason: "grid has no rows".to_string(),
            });
        }

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(GameError::InvalidGrid {
                reason: format!(
                    "row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    size
                ),
            });
        }

        Ok(Self { rows })
    }

    /// Number of rows, which is also the number of columns.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Symbol> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn rows(&self) -> &[Vec<Symbol>] {
        &self.rows
    }
}

impl std::ops::Index<(usize, usize)> for Grid {
    type Output = Symbol;

    fn index(&self, (row, col): (usize, usize)) -> &Symbol {
        &self.rows[row][col]
    }
}

impl TryFrom<Vec<Vec<Symbol>>> for Grid {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<Symbol>>) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<Symbol>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, symbol) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", symbol)?;
            }
        }
        Ok(())
    }
}

/// A line of the grid that can hold a winning triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineId {
    Row(usize),
    Column(usize),
    /// Top-left to bottom-right.
    MainDiagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Row(i) => write!(f, "row-{}", i),
            LineId::Column(j) => write!(f, "col-{}", j),
            LineId::MainDiagonal => f.write_str("diag-1"),
            LineId::AntiDiagonal => f.write_str("diag-2"),
        }
    }
}

impl FromStr for LineId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidLineId {
            line: s.to_string(),
        };

        match s {
            "diag-1" => Ok(LineId::MainDiagonal),
            "diag-2" => Ok(LineId::AntiDiagonal),
            _ => {
                if let Some(index) = s.strip_prefix("row-") {
                    index.parse().map(LineId::Row).map_err(|_| invalid())
                } else if let Some(index) = s.strip_prefix("col-") {
                    index.parse().map(LineId::Column).map_err(|_| invalid())
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

impl TryFrom<String> for LineId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LineId> for String {
    fn from(line: LineId) -> Self {
        line.to_string()
    }
}

/// Every fully matched line of a grid, rows first, then columns, then the
/// two diagonals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSet(Vec<LineId>);

impl MatchSet {
    pub fn new(lines: Vec<LineId>) -> Self {
        Self(lines)
    }

    pub fn is_win(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, line: LineId) -> bool {
        self.0.contains(&line)
    }

    pub fn lines(&self) -> &[LineId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineId> {
        self.0.iter()
    }

    /// Line names in order, e.g. `["row-0", "diag-1"]`.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(LineId::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a LineId;
    type IntoIter = std::slice::Iter<'a, LineId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of one spin as reported to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayOutcome {
    #[ts(type = "Array<Array<string>>")]
    pub grid: Grid,
    pub won: bool,
    #[ts(type = "Array<string>")]
    pub matches: MatchSet,
}

/// Durable record of a completed play. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayRecord {
    pub id: PlayRecordId,
    pub uid: String,
    pub email: String,
    #[ts(type = "Array<Array<string>>")]
    pub grid: Grid,
    pub won: bool,
    #[ts(type = "Array<string>")]
    pub matches: MatchSet,
    pub played_at: DateTime<Utc>,
}

impl PlayRecord {
    pub fn outcome(&self) -> PlayOutcome {
        PlayOutcome {
            grid: self.grid.clone(),
            won: self.won,
            matches: self.matches.clone(),
        }
    }
}

/// Whether a player may spin right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayStatus {
    pub can_play: bool,
    pub last_played: Option<DateTime<Utc>>,
    /// Start of the next calendar day when `can_play` is false.
    pub next_play_at: Option<DateTime<Utc>>,
}
