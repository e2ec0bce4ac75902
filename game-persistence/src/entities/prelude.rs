pub use super::play_records::Entity as PlayRecords;
pub use super::users::Entity as Users;
