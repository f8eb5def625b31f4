pub mod bounds;
pub mod math;
pub mod text;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use text::*;
pub use time::*;
