use dialcast_core::constants::PHONE_NUMBER_COLUMN;
use dialcast_core::{normalize_phone_number, AppError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub const MISSING_COLUMN_MESSAGE: &str =
    "Invalid file format. File must contain \"phone_number\" column.";

/// Extract normalized phone numbers from an uploaded subscriber list.
///
/// The first row is the header and must name a `phone_number` column; other columns
/// are ignored. Cells are trimmed, blank cells skipped, and every number gets a
/// leading `+` unless it already has one or starts with `00`. Row order is kept.
pub fn parse_subscriber_csv(data: &[u8]) -> Result<Vec<String>, AppError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    if std::str::from_utf8(data).is_err() {
        return Err(AppError::InvalidFormat(
            "Invalid file format. File must be UTF-8 encoded text.".to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let column = reader
        .headers()
        .map_err(|e| AppError::InvalidFormat(format!("Invalid file format. {}", e)))?
        .iter()
        .position(|name| name == PHONE_NUMBER_COLUMN)
        .ok_or_else(|| AppError::InvalidFormat(MISSING_COLUMN_MESSAGE.to_string()))?;

    let mut numbers = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::InvalidFormat(format!("Invalid file format. {}", e)))?;

        match record.get(column) {
            Some(cell) if !cell.is_empty() => numbers.push(normalize_phone_number(cell)),
            _ => continue,
        }
    }

    Ok(numbers)
}
