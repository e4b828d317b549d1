pub mod rest;
pub mod traits;
pub mod transport;

pub use rest::*;
pub use traits::*;
pub use transport::*;
