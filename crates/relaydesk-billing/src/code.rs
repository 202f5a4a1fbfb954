// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment code generation.
//!
//! Codes look like `RD251018K3J9QX2M`: prefix, UTC date as `YYMMDD`, then
//! eight random uppercase alphanumerics. Banks strip punctuation from
//! transfer descriptions, so codes are alphanumeric only.

use chrono::{DateTime, Utc};
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const RANDOM_LEN: usize = 8;

pub fn generate_code(prefix: &str, now: DateTime<Utc>) -> String {
    generate_code_with(prefix, now, &mut rand::thread_rng())
}

pub fn generate_code_with<R: Rng + ?Sized>(
    prefix: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let mut code = String::with_capacity(prefix.len() + 6 + RANDOM_LEN);
    code.push_str(&prefix.to_ascii_uppercase());
    code.push_str(&now.format("%y%m%d").to_string());
    for _ in 0..RANDOM_LEN {
        code.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
    }
    code
}

/// Codes must survive a bank transfer description unchanged.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 64 && code.chars().all(|c| c.is_ascii_alphanumeric())
}
