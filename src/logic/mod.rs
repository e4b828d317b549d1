pub mod compile;
pub mod operators;
pub mod query;

pub use compile::*;
pub use operators::*;
pub use query::*;
