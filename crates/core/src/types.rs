/// Record identifiers are the integer values of the `id` column.
pub type RecordId = i64;

/// Name of the column holding the record identifier.
pub const ID_COLUMN: &str = "id";
