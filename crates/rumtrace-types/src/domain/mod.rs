mod app;
mod session;
mod view;

pub use app::*;
pub use session::*;
pub use view::*;
