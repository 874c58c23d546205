//! Food list input parsing and bite count validation.

use crate::error::CoreError;

/// Lowest bite count offered by the input surface.
pub const MIN_UI_BITE_COUNT: u32 = 1;

/// Highest bite count offered by the input surface.
pub const MAX_UI_BITE_COUNT: u32 = 6;

/// Bite count used when the user does not choose one.
pub const DEFAULT_BITE_COUNT: u32 = 3;

/// Split newline-delimited input into food names.
///
/// Lines are trimmed and blank lines dropped. Order and duplicates are
/// preserved; submitting the same name twice yields two projects.
pub fn parse_food_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a bite count. Any positive value passes; no clamping is applied.
pub fn validate_bite_count(bite_count: u32) -> Result<(), CoreError> {
    if bite_count == 0 {
        return Err(CoreError::Validation(
            "bite count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate a single food name.
pub fn validate_food_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "food name must not be empty".to_string(),
        ));
    }
    Ok(())
}
