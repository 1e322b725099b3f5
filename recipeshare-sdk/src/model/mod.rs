pub mod friendship;
pub mod notification;
pub mod user;
