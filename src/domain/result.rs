//! Result type alias for Godwit

use super::errors::GodwitError;

/// Result type alias for Godwit operations
///
/// # Examples
///
/// ```
/// use godwit::domain::result::Result;
/// use godwit::domain::errors::GodwitError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(GodwitError::Other("nope".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GodwitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(GodwitError::Cancelled);
        assert!(result.is_err());
    }
}
