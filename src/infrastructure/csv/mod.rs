// ============================================================
// CSV INFRASTRUCTURE
// ============================================================
// Decode uploaded bytes and parse them into header + data rows.

mod decoder;
mod parser;

pub use decoder::decode_csv_bytes;
pub use parser::{parse_csv, ParsedCsv};
