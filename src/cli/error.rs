// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, refused operations
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for transport failures and unexpected backend state
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate an entry id (backend-generated: letters, numbers, underscores,
/// hyphens)
pub fn validate_entry_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("Entry id cannot be empty".to_string());
    }

    if id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(format!(
            "Invalid entry id: '{}'. Entry ids can only contain letters, numbers, underscores, and hyphens.",
            id
        ))
    }
}

/// Validate a stage key or drop target token (same charset as entry ids)
pub fn validate_target(target: &str) -> Result<(), String> {
    if target.trim().is_empty() {
        return Err("Target cannot be empty".to_string());
    }

    if target.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(format!(
            "Invalid target: '{}'. Use a stage key or another entry's id.",
            target
        ))
    }
}
