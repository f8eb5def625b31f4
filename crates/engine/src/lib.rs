pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod info_card;
pub mod preferences;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use info_card::*;
pub use preferences::*;
