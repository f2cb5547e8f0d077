//! Time-based keyed-hash proof for endpoint registration.
//!
//! The registration endpoint challenges clients with a proof-of-work
//! scheme: the current Unix timestamp is mixed with a fixed application id
//! and secret through SHA-256 and a 64-bit checksum, and the server runs
//! the same derivation to validate it. The output must therefore be
//! reproducible byte-for-byte for a given timestamp.

use sha2::{Digest, Sha256};

use skylark_core::constants::{LOCK_AND_KEY_APP_ID, LOCK_AND_KEY_SECRET};

/// Checksum modulus (2^31 - 1).
const MODULUS: u64 = 2_147_483_647;

/// Fixed multiplier applied to each input word before folding.
const FOLD_MULTIPLIER: u64 = 242_854_337;

/// Derive the proof value for a Unix timestamp (seconds, as a string).
///
/// Pure and deterministic; repeated calls with the same timestamp yield
/// the same 32-character lowercase hex string.
pub fn derive(timestamp_secs: &str) -> String {
    mac256(timestamp_secs, LOCK_AND_KEY_APP_ID, LOCK_AND_KEY_SECRET)
}

/// Render the `LockAndKey` header value for a timestamp and its proof.
///
/// Format is validated verbatim by the server:
/// `appId=<id>; time=<secs>; lockAndKeyResponse=<proof>`.
pub fn header(timestamp_secs: &str, proof: &str) -> String {
    format!("appId={LOCK_AND_KEY_APP_ID}; time={timestamp_secs}; lockAndKeyResponse={proof}")
}

fn mac256(challenge: &str, app_id: &str, secret: &str) -> String {
    // Pad challenge + appId with '0' to an 8-char boundary. The service
    // appends a full 8 chars when already aligned; that quirk is part of
    // the contract.
    let mut clear_text = format!("{challenge}{app_id}");
    let pad = 8 - clear_text.len() % 8;
    for _ in 0..pad {
        clear_text.push('0');
    }

    let clear_words: Vec<u64> = clear_text
        .as_bytes()
        .chunks_exact(4)
        .map(|c| u64::from(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
        .collect();

    // First four little-endian words of SHA-256(challenge + secret).
    let digest = Sha256::digest(format!("{challenge}{secret}").as_bytes());
    let mut sha_words = [0u64; 4];
    for (i, word) in sha_words.iter_mut().enumerate() {
        *word = u64::from(u32::from_le_bytes([
            digest[4 * i],
            digest[4 * i + 1],
            digest[4 * i + 2],
            digest[4 * i + 3],
        ]));
    }

    let (mac, sum) = checksum64(&clear_words, &sha_words);
    let mac_parts = [mac, sum, mac, sum];

    let mut out = String::with_capacity(32);
    for pos in 0..4 {
        #[allow(clippy::cast_possible_truncation)]
        let word = (sha_words[pos] ^ mac_parts[pos]) as u32;
        push_le_hex(&mut out, word);
    }
    out
}

/// The 64-bit checksum folding each pair of input words through the
/// SHA-derived coefficients. Intermediates never exceed 3 * 2^62, so plain
/// u64 arithmetic is exact.
fn checksum64(words: &[u64], coeffs: &[u64; 4]) -> (u64, u64) {
    let a = coeffs[0] & MODULUS;
    let b = coeffs[1] & MODULUS;
    let c = coeffs[2] & MODULUS;
    let d = coeffs[3] & MODULUS;

    let mut mac: u64 = 0;
    let mut sum: u64 = 0;
    for pair in words.chunks_exact(2) {
        let datum = pair[0] * FOLD_MULTIPLIER % MODULUS;
        mac = ((mac + datum) * a + b) % MODULUS;
        sum += mac;
        mac = ((mac + pair[1]) * c + d) % MODULUS;
        sum += mac;
    }
    ((mac + b) % MODULUS, (sum + d) % MODULUS)
}

/// Append a u32 as hex of its little-endian byte sequence.
fn push_le_hex(out: &mut String, word: u32) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in word.to_le_bytes() {
        out.push(HEX[usize::from(byte >> 4)] as char);
        out.push(HEX[usize::from(byte & 15)] as char);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
