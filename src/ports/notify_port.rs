//! Notification port trait.

use std::fmt;

use crate::domain::error::HacoError;

/// Where an alert gets delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Email(String),
    Sms(String),
}

impl Channel {
    pub fn kind(&self) -> &'static str {
        match self {
            Channel::Email(_) => "email",
            Channel::Sms(_) => "sms",
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Channel::Email(addr) | Channel::Sms(addr) => addr,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.address())
    }
}

pub trait NotifyPort {
    /// SMS transports may ignore `subject`.
    fn send(&self, channel: &Channel, subject: &str, body: &str) -> Result<(), HacoError>;
}
