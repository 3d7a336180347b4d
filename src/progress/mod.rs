//! Progress reporting for build invocations

mod handler;
mod logging;

pub use handler::{BuildEvent, BuildObserver, NoOpObserver};
pub use logging::LoggingObserver;
