pub mod booking;
pub mod user;
