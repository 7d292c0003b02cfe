pub mod domain;
pub mod error;
pub mod signal;

pub use domain::*;
pub use error::{Error, Result};
pub use signal::*;
