pub mod ledger;
pub mod play_record_repository;
pub mod user_repository;

pub use ledger::SqlPlayLedger;
pub use play_record_repository::PlayRecordRepository;
pub use user_repository::UserRepository;

use game_core::StoreError;

pub(crate) fn to_store_error(err: anyhow::Error) -> StoreError {
    tracing::error!("Store operation failed: {:#}", err);
    StoreError::new(format!("{:#}", err))
}
