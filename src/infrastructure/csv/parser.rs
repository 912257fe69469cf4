use crate::domain::error::{AppError, Result};
use csv::ReaderBuilder;

/// A decoded CSV split into its header row and data rows. Data rows keep
/// whatever ragged lengths the file had; the pipeline handles short rows.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV text. Requires at least a header row and one data row.
pub fn parse_csv(content: &str) -> Result<ParsedCsv> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    if rows.len() < 2 {
        return Err(AppError::ValidationError(
            "CSV needs a header row and at least one data row".to_string(),
        ));
    }

    let headers = rows.remove(0);
    Ok(ParsedCsv { headers, rows })
}
