pub mod cik;
pub mod error;
pub mod facts;
pub mod traits;
pub mod types;

pub use cik::pad_cik;
pub use error::*;
pub use facts::*;
pub use traits::*;
pub use types::*;
