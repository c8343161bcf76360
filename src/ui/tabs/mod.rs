pub mod account;
pub mod conferences;
pub mod users;
