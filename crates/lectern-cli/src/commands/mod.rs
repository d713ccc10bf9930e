//! Command implementations.

pub mod extract;
pub mod generate;
pub mod recover;

pub use self::extract::{execute_chapter, execute_extract};
pub use self::generate::{execute_generate, MaterialKind};
pub use self::recover::execute_recover;
