pub mod booking_service;
pub mod ledger;
pub mod notifier;
pub mod payment_service;
pub mod pricing;
