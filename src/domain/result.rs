//! Result type alias for emrdeid

use super::errors::EmrError;

/// Result type alias for emrdeid operations
///
/// # Examples
///
/// ```
/// use emrdeid::domain::result::Result;
/// use emrdeid::domain::errors::EmrError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(EmrError::Configuration("no target fields".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, EmrError>;
