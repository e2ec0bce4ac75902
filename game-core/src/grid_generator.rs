use game_types::{GameError, Grid, Symbol};
use rand::Rng;

pub const DEFAULT_GRID_SIZE: usize = 3;

/// Draws grids of symbols uniformly, with replacement, from a fixed alphabet.
#[derive(Debug, Clone)]
pub struct GridGenerator {
    alphabet: Vec<Symbol>,
}

impl GridGenerator {
    pub fn new(alphabet: Vec<Symbol>) -> Result<Self, GameError> {
        if alphabet.is_empty() {
            return Err(GameError::EmptyAlphabet);
        }
        Ok(Self { alphabet })
    }

    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    /// Generate a `size` x `size` grid. Each cell is an independent draw.
    pub fn generate<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<Grid, GameError> {
        if size == 0 {
            return Err(GameError::InvalidGridSize { size });
        }

        let rows = (0..size)
            .map(|_| {
                (0..size)
                    .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
                    .collect()
            })
            .collect();

        Grid::from_rows(rows)
    }
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self {
            alphabet: Symbol::ALL.to_vec(),
        }
    }
}
