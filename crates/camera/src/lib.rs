//! Map view state: the zoom transform, its constraints, gesture handling and
//! the back/forward history of views.

pub mod controller;
pub mod gesture;
pub mod history;
pub mod transform;
pub mod transition;

pub use controller::*;
pub use gesture::*;
pub use history::*;
pub use transform::*;
pub use transition::*;
