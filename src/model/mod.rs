pub mod filter;
pub mod load_options;
pub mod search;

pub use filter::*;
pub use load_options::*;
pub use search::*;
