//! API request handlers

pub mod auth;
pub mod bookings;
pub mod properties;

use serde::Serialize;

/// Plain `{"message": ...}` acknowledgement
#[derive(Debug, Serialize)]
pub struct Message {
    message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
