//! UI components for the CLI

pub mod banner;
pub mod progress;
pub mod summary;

pub use banner::*;
pub use progress::*;
pub use summary::*;
