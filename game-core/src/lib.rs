pub mod eligibility;
pub mod error;
pub mod game_round;
pub mod grid_generator;
pub mod reporting;
pub mod rng;
pub mod store;
pub mod win_detection;

// Re-export main components
pub use eligibility::*;
pub use error::*;
pub use game_round::*;
pub use grid_generator::*;
pub use reporting::*;
pub use rng::*;
pub use store::*;
pub use win_detection::*;
