pub mod auth;
pub mod password;
pub mod query;
pub mod time;
