//! The wire format's fixed base64 alphabet and its reverse lookup, built
//! once via `once_cell::sync::Lazy` — the same static-table-on-first-use
//! idiom as the teacher's own `boards::zobrist_hash::HASHER`.

use once_cell::sync::Lazy;

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// ASCII byte -> 6-bit value, `-1` for anything outside the alphabet.
static REVERSE: Lazy<[i8; 256]> = Lazy::new(|| {
    let mut table = [-1i8; 256];
    for (value, &byte) in ALPHABET.iter().enumerate() {
        table[byte as usize] = value as i8;
    }
    table
});

pub fn encode_groups(groups: &[u8]) -> String {
    groups.iter().map(|&g| ALPHABET[(g & 0x3f) as usize] as char).collect()
}

/// Decodes a base64 string into its 6-bit groups. `None` on any character
/// outside the alphabet — a malformed hash must never panic, only refuse.
pub fn decode_groups(s: &str) -> Option<Vec<u8>> {
    if !s.is_ascii() {
        return None;
    }
    s.bytes()
        .map(|b| {
            let v = REVERSE[b as usize];
            (v >= 0).then_some(v as u8)
        })
        .collect()
}
