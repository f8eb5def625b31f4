pub mod datasets;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod source;
pub mod us_states;

pub use datasets::*;
pub use error::*;
pub use loader::*;
pub use lookup::*;
pub use source::*;
pub use us_states::*;
