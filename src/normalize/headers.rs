//! Header normalization & duplicate detection.
//!
//! Rules:
//! - ASCII-trim header names (spaces + tabs only).
//! - Empty headers become `__col_<1-based index>` so they never collide.
//! - Normalized headers must be unique (case-sensitive); duplicates are errors.

use std::collections::HashMap;

use crate::normalize::trim::ascii_trim;

/// Duplicate header error (after normalization).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateHeader {
    pub name: String,
    pub first_index: usize,
    pub second_index: usize,
}

/// Normalize a header row.
pub fn normalize_headers<'a, I>(headers: I) -> Result<Vec<String>, DuplicateHeader>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut normalized = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (idx, header) in headers.into_iter().enumerate() {
        let name = normalize_header_name(header, idx + 1);
        if let Some(first) = seen.get(&name).copied() {
            return Err(DuplicateHeader {
                name,
                first_index: first,
                second_index: idx + 1,
            });
        }
        seen.insert(name.clone(), idx + 1);
        normalized.push(name);
    }

    Ok(normalized)
}

/// Normalize a single header name.
pub fn normalize_header_name(header: &str, index: usize) -> String {
    let trimmed = ascii_trim(header);
    if trimmed.is_empty() {
        format!("__col_{index}")
    } else {
        trimmed.to_string()
    }
}

/// Position of `name` in a normalized header row.
pub fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|header| header == name)
}
