//! # Notification Services
//!
//! This crate delivers email notifications for the room monitor.
//! It defines the `EmailService` seam used by the scan crate and an AWS SES
//! implementation of it.

/// Email service trait and the AWS SES implementation.
pub mod service;
/// Message and error types for notifications.
pub mod types;

pub use service::{EmailService, SesEmailService};
pub use types::{EmailMessage, NotificationError};
