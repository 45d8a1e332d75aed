//! Identifier and timestamp utilities
//!
//! Every booking, baggage piece and vehicle carries its own scannable
//! identifier; the generators here are shared by the normalizer and the
//! submission fallback path.

use rand::{Rng, RngCore};

/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a collision-resistant barcode identifier.
///
/// Prefers a v4 UUID from the OS CSPRNG. If the RNG refuses to fill
/// (headless/sandboxed environments without an entropy source), degrades
/// to a timestamp + base36 format instead of blocking or panicking.
pub fn new_barcode_id() -> String {
    let mut bytes = [0u8; 16];
    match rand::thread_rng().try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "RNG unavailable, using fallback barcode id");
            fallback_barcode_id()
        }
    }
}

/// Fallback barcode identifier: `BR-<millis>-<base36 x 8>`.
pub fn fallback_barcode_id() -> String {
    format!("BR-{}-{}", now_millis(), random_base36(8))
}

/// Generate a user record identifier: `u-<millis>-<base36 x 7>`.
pub fn new_user_id() -> String {
    format!("u-{}-{}", now_millis(), random_base36(7))
}

/// Generate a local booking reference: `SC-<base36 millis>-<base36 x 2>`.
///
/// Assigned only by the submission fallback path when the remote API is
/// unreachable; the format is distinct from server-issued references so
/// locally committed bookings remain recognizable.
pub fn local_reference() -> String {
    let ts = to_base36(now_millis() as u64).to_uppercase();
    let rand: u64 = rand::thread_rng().gen_range(0..36 * 36);
    format!("SC-{}-{:0>2}", ts, to_base36(rand).to_uppercase())
}

/// Generate a 6-digit email verification code.
pub fn verification_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000u32).to_string()
}

fn random_base36(len: usize) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn to_base36(mut n: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 alphabet is ASCII")
}
