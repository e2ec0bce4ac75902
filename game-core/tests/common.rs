#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use game_core::{
    EligibilityGate, GameRng, GameRound, GridGenerator, PlayLedger, RecordStore, StoreError,
    UserStateStore,
};
use game_types::{Grid, Player, PlayRecord, Symbol};
use tokio::sync::Mutex;

/// In-memory ledger with switches to make either write fail.
#[derive(Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<PlayRecord>>,
    last_played: Mutex<HashMap<String, DateTime<Utc>>>,
    pub fail_append: AtomicBool,
    pub fail_state_write: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }

    pub fn fail_appends(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }

    pub fn fail_state_writes(&self) {
        self.fail_state_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryLedger {
    async fn append(&self, record: &PlayRecord) -> Result<(), StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::new("record store unavailable"));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<PlayRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn query_by_user(&self, uid: &str) -> Result<Vec<PlayRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.uid == uid)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStateStore for MemoryLedger {
    async fn read(&self, uid: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.last_played.lock().await.get(uid).copied())
    }

    async fn write(
        &self,
        uid: &str,
        _email: &str,
        played_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.fail_state_write.load(Ordering::SeqCst) {
            return Err(StoreError::new("user store unavailable"));
        }
        self.last_played
            .lock()
            .await
            .insert(uid.to_string(), played_at);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        uid: &str,
        _email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if self.fail_state_write.load(Ordering::SeqCst) {
            return Err(StoreError::new("user store unavailable"));
        }
        let mut state = self.last_played.lock().await;
        if state.get(uid).copied() != expected {
            return Ok(false);
        }
        state.insert(uid.to_string(), played_at);
        Ok(true)
    }
}

#[async_trait]
impl PlayLedger for MemoryLedger {}

pub fn player(name: &str) -> Player {
    Player {
        uid: format!("uid-{}", name.to_lowercase()),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Round over `ledger` with calendar days in UTC.
pub fn create_round(ledger: Arc<MemoryLedger>, seed: u64) -> GameRound<MemoryLedger, Utc> {
    GameRound::new(ledger, EligibilityGate::new(Utc), GameRng::new(seed))
}

/// Round whose grids are always a single repeated symbol.
pub fn create_always_winning_round(ledger: Arc<MemoryLedger>) -> GameRound<MemoryLedger, Utc> {
    create_round(ledger, 0).with_generator(GridGenerator::new(vec![Symbol::Kiwi]).unwrap())
}

pub fn grid(rows: Vec<Vec<Symbol>>) -> Grid {
    Grid::from_rows(rows).unwrap()
}
