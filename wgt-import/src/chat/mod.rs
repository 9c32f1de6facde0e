//! Chat export parsing
//!
//! - [`message`]: raw lines -> messages
//! - [`result`]: messages -> raw results

pub mod message;
pub mod result;

pub use message::{messages, Message, Messages, ReconstructStats};
pub use result::{extract, extract_all, ExtractError, RawResult};
