//! Configuration file parsing
//!
//! - `directive`: keyword table
//! - `tokenizer`: line splitting and value helpers
//! - `server`: server pool blocks
//! - `loader`: top-level parser and file loading
//! - `validator`: checks run after the whole file is read
//! - `schema`: the resulting data model

pub mod directive;
pub mod loader;
pub mod schema;
pub mod server;
pub mod tokenizer;
pub mod validator;

pub use directive::Directive;
pub use loader::ConfigLoader;
pub use schema::{Config, ServerEntry};
pub use server::PoolKind;
pub use validator::ConfigValidator;
