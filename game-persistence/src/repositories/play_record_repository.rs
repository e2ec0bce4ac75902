use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{play_records, prelude::*};
use crate::repositories::to_store_error;
use game_core::{RecordStore, StoreError};
use game_types::PlayRecord;

/// Append-only store of completed plays. Grid and matches are kept as JSON
/// text.
pub struct PlayRecordRepository {
    db: DatabaseConnection,
}

impl PlayRecordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_record(model: play_records::Model) -> Result<PlayRecord> {
        let grid = serde_json::from_str(&model.grid)
            .with_context(|| format!("Corrupt grid in play record {}", model.id))?;
        let matches = serde_json::from_str(&model.matches)
            .with_context(|| format!("Corrupt matches in play record {}", model.id))?;

        Ok(PlayRecord {
            id: model.id,
            uid: model.uid,
            email: model.email,
            grid,
            won: model.won,
            matches,
            played_at: model.played_at,
        })
    }

    pub async fn append(&self, record: &PlayRecord) -> Result<()> {
        Self::insert_on(&self.db, record).await
    }

    /// All plays, newest first.
    pub async fn find_all(&self) -> Result<Vec<PlayRecord>> {
        let models = PlayRecords::find()
            .order_by_desc(play_records::Column::PlayedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_record).collect()
    }

    /// One user's plays, newest first.
    pub async fn find_by_user(&self, uid: &str) -> Result<Vec<PlayRecord>> {
        let models = PlayRecords::find()
            .filter(play_records::Column::Uid.eq(uid))
            .order_by_desc(play_records::Column::PlayedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_record).collect()
    }

    pub(crate) async fn insert_on<C: ConnectionTrait>(db: &C, record: &PlayRecord) -> Result<()> {
        let record_model = play_records::ActiveModel {
            id: ActiveValue::Set(record.id),
            uid: ActiveValue::Set(record.uid.clone()),
            email: ActiveValue::Set(record.email.clone()),
            grid: ActiveValue::Set(serde_json::to_string(&record.grid)?),
            won: ActiveValue::Set(record.won),
            matches: ActiveValue::Set(serde_json::to_string(&record.matches)?),
            played_at: ActiveValue::Set(record.played_at),
            created_at: ActiveValue::Set(Utc::now()),
        };

        PlayRecords::insert(record_model)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PlayRecordRepository {
    async fn append(&self, record: &PlayRecord) -> Result<(), StoreError> {
        PlayRecordRepository::append(self, record)
            .await
            .map_err(to_store_error)
    }

    async fn query_all(&self) -> Result<Vec<PlayRecord>, StoreError> {
        self.find_all().await.map_err(to_store_error)
    }

    async fn query_by_user(&self, uid: &str) -> Result<Vec<PlayRecord>, StoreError> {
        self.find_by_user(uid).await.map_err(to_store_error)
    }
}
