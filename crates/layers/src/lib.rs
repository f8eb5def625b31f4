pub mod cache;
pub mod choropleth;
pub mod indicator;
pub mod overlay;
pub mod symbology;

pub use cache::*;
pub use choropleth::*;
pub use indicator::*;
pub use overlay::*;
pub use symbology::*;
