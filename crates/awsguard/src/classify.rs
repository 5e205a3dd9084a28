//! Error classification against transient-failure signatures.
//!
//! Every predicate accepts any `std::error::Error` and first looks for the
//! structured [`AwsError`] shape: the value itself, an [`Error`] carrying
//! one, or any error further down the `source()` chain. Errors without that
//! shape never match.
//!
//! Code tables are always passed in by the caller; nothing here holds a
//! list of known transient codes.

use crate::error::{AwsError, Error};
use std::error::Error as StdError;

/// Find the structured API error inside `err`, if there is one.
pub fn find_aws_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a AwsError> {
    let mut current = Some(err);
    while let Some(candidate) = current {
        if let Some(aws) = candidate.downcast_ref::<AwsError>() {
            return Some(aws);
        }
        if let Some(aws) = candidate
            .downcast_ref::<Error>()
            .and_then(Error::aws_error)
        {
            return Some(aws);
        }
        current = candidate.source();
    }
    None
}

/// Returns true if `err` is an API error whose code is exactly `code`.
pub fn is_aws_err_code(err: &(dyn StdError + 'static), code: &str) -> bool {
    find_aws_error(err).is_some_and(|aws| aws.code() == code)
}

/// Returns true if the error matches all these conditions:
///  * `err` carries an API error
///  * its code is exactly `code`
///  * its message contains `message` (case-sensitive substring)
pub fn is_aws_err(err: &(dyn StdError + 'static), code: &str, message: &str) -> bool {
    find_aws_error(err).is_some_and(|aws| aws.code() == code && aws.message().contains(message))
}

/// Returns true if `err` is an API error whose code is any of `codes`.
pub fn is_aws_err_any_code<S: AsRef<str>>(err: &(dyn StdError + 'static), codes: &[S]) -> bool {
    find_aws_error(err)
        .is_some_and(|aws| codes.iter().any(|code| aws.code() == code.as_ref()))
}

/// Returns true if `err` is an API request failure with transport status
/// `status_code`.
///
/// Prefer [`is_aws_err_code`]; this exists for older APIs (S3, for one) that
/// sometimes answer with nothing but a status code.
pub fn is_aws_err_request_failure_status_code(
    err: &(dyn StdError + 'static),
    status_code: u16,
) -> bool {
    find_aws_error(err).is_some_and(|aws| aws.status_code() == Some(status_code))
}
