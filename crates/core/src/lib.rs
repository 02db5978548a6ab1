pub mod activity;
pub mod message;
pub mod status;
pub mod text;
pub mod transcript;

pub use activity::*;
pub use message::*;
pub use status::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
