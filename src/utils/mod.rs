pub mod code;

pub use code::{generate_short_code, is_valid_short_code};
