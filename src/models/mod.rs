pub mod analytics;
pub mod credential;
pub mod payment;
pub mod token;

pub use analytics::*;
pub use credential::*;
pub use payment::*;
pub use token::{SupportedToken, SUPPORTED_TOKENS};
