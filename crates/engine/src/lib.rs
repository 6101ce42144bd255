pub mod clip;
pub mod prompt;
pub mod resolve;
pub mod types;

pub use clip::*;
pub use resolve::*;
pub use types::*;
