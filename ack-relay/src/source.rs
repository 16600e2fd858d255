//! Record source: the first column of a local CSV file.
//!
//! The file has no header row.  Each non-blank row contributes its first
//! field as one record, in file order.  Rows whose first field is empty are
//! dropped.  A double-quoted field is unquoted (`""` stands for one `"`) and
//! may contain commas and line breaks.  Field text is otherwise passed
//! through verbatim.

use std::fs;
use std::io;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use crate::error::SourceError;

/// Read every record from the CSV at `path`.
pub fn load_records(path: &Path) -> Result<Vec<String>, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let records = parse_records(&text);
    log::info!("[csv] loaded {} line(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Extract the first-column records from CSV text.
pub fn parse_records(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut chars = text.chars().peekable();
    let mut records = Vec::new();
    while chars.peek().is_some() {
        let field = first_field(&mut chars);
        if !field.is_empty() {
            records.push(field);
        }
    }
    records
}

/// Consume one CSV row from `chars` and return its first field.
///
/// A row ends at `\n`, `\r\n` or a lone `\r` outside quotes.  Quotes are
/// tracked in every column, so a later field's quoted line break does not end
/// the row either.
fn first_field(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut field = String::new();
    let mut column = 0usize;
    let mut field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                if column == 0 {
                    field.push(c);
                }
            } else if chars.next_if_eq(&'"').is_some() {
                if column == 0 {
                    field.push('"');
                }
            } else {
                // Closing quote; text up to the next comma still belongs here.
                in_quotes = false;
            }
            continue;
        }

        match c {
            '\n' => break,
            '\r' => {
                let _ = chars.next_if_eq(&'\n');
                break;
            }
            ',' => {
                column += 1;
                field_start = true;
                continue;
            }
            '"' if field_start => in_quotes = true,
            _ if column == 0 => field.push(c),
            _ => {}
        }
        field_start = false;
    }
    field
}
