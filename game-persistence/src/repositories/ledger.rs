use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::repositories::{PlayRecordRepository, UserRepository, to_store_error};
use game_core::{PlayLedger, RecordStore, StoreError, UserStateStore};
use game_types::PlayRecord;

/// SQL-backed [`PlayLedger`]. The record insert and the `last_played`
/// compare-and-set run in one transaction, so either both land or neither.
pub struct SqlPlayLedger {
    db: DatabaseConnection,
    users: UserRepository,
    records: PlayRecordRepository,
}

impl SqlPlayLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            records: PlayRecordRepository::new(db.clone()),
            db,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn records(&self) -> &PlayRecordRepository {
        &self.records
    }

    async fn commit_in_transaction(
        &self,
        record: &PlayRecord,
        expected: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        let claimed = UserRepository::compare_and_set_on(
            &txn,
            &record.uid,
            &record.email,
            expected,
            record.played_at,
        )
        .await?;

        if !claimed {
            txn.rollback().await?;
            return Ok(false);
        }

        // Dropping the transaction on error rolls the claim back
        PlayRecordRepository::insert_on(&txn, record).await?;
        txn.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl RecordStore for SqlPlayLedger {
    async fn append(&self, record: &PlayRecord) -> Result<(), StoreError> {
        RecordStore::append(&self.records, record).await
    }

    async fn query_all(&self) -> Result<Vec<PlayRecord>, StoreError> {
        self.records.query_all().await
    }

    async fn query_by_user(&self, uid: &str) -> Result<Vec<PlayRecord>, StoreError> {
        self.records.query_by_user(uid).await
    }
}

#[async_trait]
impl UserStateStore for SqlPlayLedger {
    async fn read(&self, uid: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.users.read(uid).await
    }

    async fn write(&self, uid: &str, email: &str, played_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.users.write(uid, email, played_at).await
    }

    async fn compare_and_set(
        &self,
        uid: &str,
        email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.users
            .compare_and_set(uid, email, expected, played_at)
            .await
    }
}

#[async_trait]
impl PlayLedger for SqlPlayLedger {
    async fn commit_play(
        &self,
        record: &PlayRecord,
        expected: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        self.commit_in_transaction(record, expected)
            .await
            .map_err(to_store_error)
    }
}
