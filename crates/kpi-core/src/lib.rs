pub mod change;
pub mod error;
pub mod traits;
pub mod types;

pub use change::*;
pub use error::*;
pub use traits::*;
pub use types::*;
