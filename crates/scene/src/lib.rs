pub mod feature;
pub mod geometry;
pub mod iso;
pub mod projector;
pub mod search;
pub mod world;

pub use feature::*;
pub use geometry::*;
pub use iso::*;
pub use projector::*;
pub use search::*;
pub use world::*;
