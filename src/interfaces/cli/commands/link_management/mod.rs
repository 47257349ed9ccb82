mod code;
mod shorten;
mod stats;

pub use code::print_code;
pub use shorten::shorten_url;
pub use stats::show_stats;
