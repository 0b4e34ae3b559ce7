pub mod error;
pub mod html_snapshot;
pub mod session;
pub mod snapshot;
