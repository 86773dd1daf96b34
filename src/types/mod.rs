pub mod frame;
pub mod header;
pub mod log;

pub use frame::*;
pub use header::*;
pub use log::*;
