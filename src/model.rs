pub mod course;
pub mod rounds;
pub mod stats;
pub mod types;

pub use course::*;
pub use rounds::*;
pub use stats::*;
pub use types::*;
