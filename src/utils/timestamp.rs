//! ISO-8601 instants as written to logs and export files.
//!
//! Instants render in UTC with millisecond precision and a `Z` suffix,
//! e.g. `2025-03-01T09:30:05.042Z`.

use serde::Serializer;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Render `instant` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso_string(instant: OffsetDateTime) -> Result<String, time::error::Format> {
    instant.to_offset(UtcOffset::UTC).format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
}

/// ISO string with `:` and `.` replaced by `-`, safe for file names.
pub fn to_file_stamp(instant: OffsetDateTime) -> Result<String, time::error::Format> {
    Ok(to_iso_string(instant)?.replace([':', '.'], "-"))
}

/// `serialize_with` adapter for [`to_iso_string`].
pub fn serialize_iso<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = to_iso_string(*instant).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}
