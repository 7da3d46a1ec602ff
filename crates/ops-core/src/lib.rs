pub mod catalog;
pub mod dispatch;
pub mod event_bus;
pub mod executor;
pub mod ports;
pub mod session;


pub use catalog::{Action, ActionCatalog, ActionKind};
pub use dispatch::{DispatchError, DispatchSummary, Dispatcher};
pub use event_bus::EventBus;
pub use executor::{ActionExecutor, ExecutorSettings};
pub use session::{Session, SessionReply, SessionState};
