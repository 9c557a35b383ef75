pub const INVALID_INPUT: &str = "invalid_input";
pub const TOO_LARGE: &str = "too_large";
pub const INTERNAL_ERROR: &str = "internal_error";
