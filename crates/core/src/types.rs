/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier for projects, comics, pages, panels and characters.
///
/// Stored as opaque strings so documents written by older clients
/// (`project-<millis>`, `panel-<index>`) keep loading.
pub type EntityId = String;
