pub mod booking;
pub mod partner;
pub mod payment;
