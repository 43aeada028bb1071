use crate::config::*;

/// Reads the value of a row through one of two candidate column names.
///
/// The primary column is used if the record set has it, otherwise the
/// secondary one. Missing columns, absent values and rows past the end all
/// produce `default`. This function never fails.
pub fn resolve(
    records: &RecordSet,
    primary_id: &str,
    secondary_id: &str,
    row_index: usize,
    default: &str,
) -> String {
    let column = if records.has_column(primary_id) {
        primary_id
    } else if records.has_column(secondary_id) {
        secondary_id
    } else {
        return default.to_string();
    };
    records
        .value(row_index, column)
        .and_then(|v| v.render())
        .unwrap_or_else(|| default.to_string())
}

/// Reads a logical field of a row, checking both of its physical names.
pub fn resolve_field(records: &RecordSet, field: Field, row_index: usize, default: &str) -> String {
    let (primary, secondary) = field.column_names();
    resolve(records, primary, secondary, row_index, default)
}
