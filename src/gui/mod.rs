mod app;
mod message;
mod view_search;
mod view_shelf;

pub use app::{App, Config};
pub use message::Message;
