//! Resource identifier extraction.
//!
//! Redfish links are `@odata.id` paths such as `/redfish/v1/Managers/bmc-1`.
//! The last path segment is the ID the next request is addressed by.

use crate::error::RemoteDirectError;

/// Final path segment of a resource reference.
///
/// A single trailing `/` is tolerated. A reference without any `/`, or whose
/// final segment is empty, is rejected as `MalformedReference`.
pub fn resource_id(reference: &str) -> Result<&str, RemoteDirectError> {
    let trimmed = reference.strip_suffix('/').unwrap_or(reference);
    match trimmed.rsplit_once('/') {
        Some((_, id)) if !id.is_empty() => Ok(id),
        _ => Err(RemoteDirectError::MalformedReference {
            reference: reference.to_string(),
        }),
    }
}
