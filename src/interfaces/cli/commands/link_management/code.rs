//! Code command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::utils::code::MAX_CODE_LENGTH;
use crate::utils::generate_short_code;

/// 只计算短码，不写存储
pub fn print_code(url: &str, length: usize) -> Result<(), CliError> {
    if !(1..=MAX_CODE_LENGTH).contains(&length) {
        return Err(CliError::ParseError(format!(
            "code length must be between 1 and {}, got {}",
            MAX_CODE_LENGTH, length
        )));
    }

    let code = generate_short_code(url, length);
    println!("{} -> {}", url.blue().underline(), code.cyan());
    Ok(())
}
