pub mod error;
pub mod types;

pub use error::CaseModelError;
pub use types::*;
