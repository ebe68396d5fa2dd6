pub mod auth;
pub mod booking;
pub mod catalog;
pub mod notification;
pub mod payment;
