pub mod geojson;
pub mod tabular;

pub use geojson::*;
pub use tabular::*;
