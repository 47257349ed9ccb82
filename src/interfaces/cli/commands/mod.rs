//! CLI command implementations

mod check_provider;
mod config_management;
mod link_management;

pub use check_provider::check_provider;
pub use config_management::config_generate;
pub use link_management::{print_code, shorten_url, show_stats};
