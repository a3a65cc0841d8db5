pub mod booking;
pub mod building;
pub mod notification;
pub mod room;
pub mod user;
