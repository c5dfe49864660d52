mod types;

pub use types::{FloorplanError, Result};
