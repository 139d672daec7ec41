// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Content fingerprinting for duplicate detection

use std::path::Path;

use crate::Result;

/// Fingerprint raw bytes (blake3 hex)
pub fn fingerprint(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Fingerprint a file's contents
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(fingerprint(&data))
}
