//! Result type alias for bpagen

use super::errors::BpaError;

/// Result type alias for bpagen operations
///
/// # Examples
///
/// ```
/// use bpagen::domain::result::Result;
/// use bpagen::domain::errors::BpaError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BpaError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BpaError>;
