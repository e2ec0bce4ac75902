pub mod prelude;

pub mod play_records;
pub mod users;
