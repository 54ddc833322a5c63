use crate::error::CommonError;

/// Result alias for storage and shared helpers
pub type CommonResult<T> = Result<T, CommonError>;
