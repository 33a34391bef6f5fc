//! Account registration
//!
//! Email-verified account creation: request a validation token for the
//! address, then register with the resulting three-PID credentials.

mod errors;
mod registration;

pub use errors::{AccountError, AccountResult};
pub use registration::{AuthBackend, RegistrationService, ThreePidCredentials};
