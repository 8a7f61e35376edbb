pub mod dispatcher;

pub use dispatcher::{EventDispatcher, EventHandler, EventKey, Subscription};
