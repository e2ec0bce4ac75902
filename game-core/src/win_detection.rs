use game_types::{Grid, LineId, MatchSet, Symbol};

pub struct WinDetector;

impl WinDetector {
    /// Find every fully matched line in the grid.
    ///
    /// Lines are checked independently, so a single grid can match several
    /// at once. Works for any grid size.
    pub fn detect(grid: &Grid) -> MatchSet {
        let size = grid.size();
        let mut matches = Vec::new();

        for i in 0..size {
            if Self::line_matches((0..size).map(|j| grid[(i, j)])) {
                matches.push(LineId::Row(i));
            }
        }

        for j in 0..size {
            if Self::line_matches((0..size).map(|i| grid[(i, j)])) {
                matches.push(LineId::Column(j));
            }
        }

        if Self::line_matches((0..size).map(|i| grid[(i, i)])) {
            matches.push(LineId::MainDiagonal);
        }

        if Self::line_matches((0..size).map(|i| grid[(i, size - 1 - i)])) {
            matches.push(LineId::AntiDiagonal);
        }

        MatchSet::new(matches)
    }

    /// Every cell equals the first cell of the line.
    fn line_matches(mut cells: impl Iterator<Item = Symbol>) -> bool {
        match cells.next() {
            Some(first) => cells.all(|cell| cell == first),
            None => false,
        }
    }
}
