use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use game_types::{GameError, Player, PlayOutcome, PlayRecord, PlayStatus};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    DEFAULT_GRID_SIZE, EligibilityGate, GameRng, GridGenerator, PlayError, PlayLedger,
    WinDetector,
};

/// One daily spin: gate, generate, detect, commit, report.
pub struct GameRound<S: ?Sized, Tz = Local> {
    ledger: Arc<S>,
    generator: GridGenerator,
    gate: EligibilityGate<Tz>,
    rng: Mutex<GameRng>,
    grid_size: usize,
}

impl<S, Tz> GameRound<S, Tz>
where
    S: PlayLedger + ?Sized,
    Tz: TimeZone,
{
    pub fn new(ledger: Arc<S>, gate: EligibilityGate<Tz>, rng: GameRng) -> Self {
        Self {
            ledger,
            generator: GridGenerator::default(),
            gate,
            rng: Mutex::new(rng),
            grid_size: DEFAULT_GRID_SIZE,
        }
    }

    pub fn with_generator(mut self, generator: GridGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Result<Self, GameError> {
        if grid_size == 0 {
            return Err(GameError::InvalidGridSize { size: grid_size });
        }
        self.grid_size = grid_size;
        Ok(self)
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn gate(&self) -> &EligibilityGate<Tz> {
        &self.gate
    }

    pub fn ledger(&self) -> &Arc<S> {
        &self.ledger
    }

    pub async fn status(&self, player: &Player, now: DateTime<Utc>) -> Result<PlayStatus, PlayError> {
        let last_played = self.ledger.read(&player.uid).await?;

        Ok(PlayStatus {
            can_play: self.gate.can_play(last_played, now),
            last_played,
            next_play_at: self.gate.next_eligible_at(last_played, now),
        })
    }

    pub async fn play(&self, player: &Player) -> Result<PlayOutcome, PlayError> {
        self.play_at(player, Utc::now()).await
    }

    /// Play at a given instant.
    ///
    /// Eligibility is re-read from the store here rather than trusted from
    /// an earlier status call. The outcome is returned only once the record
    /// and the new `last_played` have both been committed.
    pub async fn play_at(&self, player: &Player, now: DateTime<Utc>) -> Result<PlayOutcome, PlayError> {
        let last_played = self.ledger.read(&player.uid).await?;
        if !self.gate.can_play(last_played, now) {
            warn!("User {} already played today", player.uid);
            return Err(PlayError::AlreadyPlayed);
        }

        let grid = {
            let mut rng = self.rng.lock().await;
            self.generator.generate(self.grid_size, &mut *rng)
        }
        .map_err(PlayError::Generation)?;

        let matches = WinDetector::detect(&grid);
        let record = PlayRecord {
            id: Uuid::new_v4(),
            uid: player.uid.clone(),
            email: player.email.clone(),
            grid,
            won: matches.is_win(),
            matches,
            played_at: now,
        };

        if !self.ledger.commit_play(&record, last_played).await? {
            warn!(
                "User {} lost a concurrent play for the same day, discarding play {}",
                player.uid, record.id
            );
            return Err(PlayError::AlreadyPlayed);
        }

        info!(
            "User {} played {}: won={} matches={:?}",
            player.uid,
            record.id,
            record.won,
            record.matches.to_strings()
        );

        Ok(record.outcome())
    }
}
