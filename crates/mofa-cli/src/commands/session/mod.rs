//! Session management commands

pub mod delete;
pub mod export;
pub mod list;
pub mod show;

pub use delete::*;
pub use export::*;
pub use list::*;
pub use show::*;
