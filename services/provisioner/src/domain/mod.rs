//! 领域层

mod context;
mod flavor;
mod step;

pub use context::*;
pub use flavor::*;
pub use step::*;
