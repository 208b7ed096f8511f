//! Booking references: `BK<base36 millis><4 random chars>`. Not
//! guaranteed unique; the ledger retries up to [`MAX_ATTEMPTS`] times.

use rand::Rng;

pub const PREFIX: &str = "BK";
pub const MAX_ATTEMPTS: u32 = 10;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produce one candidate reference.
pub fn generate() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();

    let mut out = String::with_capacity(16);
    out.push_str(PREFIX);
    out.push_str(&encode_base36(millis));
    for _ in 0..4 {
        out.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
    }
    out
}

fn encode_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = [0u8; 13];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = ALPHABET[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&buf[i..]).into_owned()
}
