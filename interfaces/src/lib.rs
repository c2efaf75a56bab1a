pub mod defs;
pub mod empty;

pub use defs::{ImportError, Post, Room, Session, SourcePlugin, Speaker};
pub use empty::EmptySource;
