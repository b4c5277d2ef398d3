pub mod context;
pub mod error;

pub use context::{AppContext, Credentials};
pub use error::{HatebError, Result};
