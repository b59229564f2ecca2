// Re-export all model types
pub use self::dinner::*;
pub use self::errors::*;
pub use self::food::*;
pub use self::validation::*;

mod dinner;
mod errors;
mod food;
mod validation;
