//! Command handlers for CLI subcommands

mod configs;
mod serve;
mod validate;

pub use configs::handle_configs;
pub use serve::handle_serve;
pub use validate::handle_validate;
