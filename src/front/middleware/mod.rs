pub mod csrf_token;
pub mod session_user;
