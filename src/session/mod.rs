pub mod manager;
pub mod store;
pub mod token;

pub use manager::{Session, SessionManager};
