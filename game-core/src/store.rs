//! Storage contracts consumed by [`crate::GameRound`].
//!
//! Records are append-only. The user state is a single `last_played` instant
//! per user, written with compare-and-set so that two concurrent plays for
//! the same user cannot both claim the same day.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use game_types::PlayRecord;

use crate::StoreError;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, record: &PlayRecord) -> Result<(), StoreError>;

    async fn query_all(&self) -> Result<Vec<PlayRecord>, StoreError>;

    async fn query_by_user(&self, uid: &str) -> Result<Vec<PlayRecord>, StoreError>;
}

#[async_trait]
pub trait UserStateStore: Send + Sync {
    async fn read(&self, uid: &str) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Unconditionally overwrite `last_played`, creating the user if needed.
    async fn write(&self, uid: &str, email: &str, played_at: DateTime<Utc>)
        -> Result<(), StoreError>;

    /// Set `last_played` to `played_at` only if it currently equals
    /// `expected`. Returns `false` without writing when it does not.
    async fn compare_and_set(
        &self,
        uid: &str,
        email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// Commits the two halves of a play: the record and the user-state update.
#[async_trait]
pub trait PlayLedger: RecordStore + UserStateStore {
    /// Returns `false` when `last_played` no longer equals `expected`, in
    /// which case nothing was written.
    ///
    /// The default claims the day first and appends second. If the append
    /// fails the player stays blocked for the day but no unrecorded result is
    /// ever reported. Stores with transactions should override this to make
    /// both writes atomic.
    async fn commit_play(
        &self,
        record: &PlayRecord,
        expected: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        let claimed = self
            .compare_and_set(&record.uid, &record.email, expected, record.played_at)
            .await?;
        if !claimed {
            return Ok(false);
        }

        if let Err(e) = self.append(record).await {
            tracing::error!(
                "Play {} for user {} claimed the day but was not recorded: {}",
                record.id,
                record.uid,
                e
            );
            return Err(e);
        }

        Ok(true)
    }
}
