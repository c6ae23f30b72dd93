pub mod error;
pub mod logger;
pub mod secret;
pub mod validation;
