pub mod connection;
pub mod delivery;
pub mod dispatcher;

pub use delivery::{DeliveryCoordinator, SendError};
pub use dispatcher::Dispatcher;
