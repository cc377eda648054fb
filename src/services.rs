pub mod appointment_service;
pub mod auth;
pub mod billing_service;
pub mod document_service;
pub mod email;
pub mod notification_service;
