pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod runtime;
pub mod shared;
pub mod ticker;

pub use clock::{Clock, SystemClock};
pub use config::{Config, resolve_config_path};
pub use error::{Error, Result};
pub use feed::read_feed;
pub use runtime::Runtime;
pub use shared::SharedEngine;
pub use ticker::TimeoutTicker;
