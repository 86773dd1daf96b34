pub mod decoder;
pub mod frame;
pub mod gyro;
pub mod header;
pub mod main;
pub mod schema;
pub mod stream;

pub use decoder::*;
pub use frame::*;
pub use gyro::*;
pub use header::*;
pub use main::*;
pub use schema::*;
pub use stream::*;
