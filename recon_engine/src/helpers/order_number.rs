//! Human-facing order number generation.
//!
//! Order numbers are 8 uppercase alphanumeric characters built from a time-based component plus
//! random characters. Uniqueness is enforced against the store at creation time with a bounded
//! number of retries; if the retries are exhausted the caller falls back to
//! [`timestamp_fallback`] and accepts the residual collision risk rather than failing the order.
//! Order creation must never fail because of numbering contention.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::OrderNumber;

pub const ORDER_NUMBER_LEN: usize = 8;
/// Uniqueness retries before degrading to the timestamp fallback.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A fresh candidate: the three low-order base-36 digits of the unix timestamp, then five random
/// characters. The time prefix spreads candidates generated in the same second apart from those
/// of neighbouring seconds, which keeps collision retries rare under burst load.
pub fn candidate_order_number<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> OrderNumber {
    #[allow(clippy::cast_sign_loss)]
    let secs = now.timestamp().max(0) as u64;
    let mut number = base36(secs, 3);
    for _ in 0..ORDER_NUMBER_LEN - 3 {
        let idx = rng.gen_range(0..ALPHABET.len());
        number.push(ALPHABET[idx] as char);
    }
    OrderNumber::from(number)
}

/// The last-resort number when all random candidates collided: all 8 characters derived from the
/// current time at microsecond resolution. Two orders would need to exhaust their retries within
/// the same microsecond to collide here.
pub fn timestamp_fallback(now: DateTime<Utc>) -> OrderNumber {
    #[allow(clippy::cast_sign_loss)]
    let micros = now.timestamp_micros().max(0) as u64;
    OrderNumber::from(base36(micros, ORDER_NUMBER_LEN))
}

/// The `len` low-order base-36 digits of `value`, most significant first, zero padded.
fn base36(mut value: u64, len: usize) -> String {
    let mut out = vec![b'0'; len];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8(out).expect("base36 output is ASCII")
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    fn is_well_formed(n: &OrderNumber) -> bool {
        n.as_str().len() == ORDER_NUMBER_LEN &&
            n.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }

    #[test]
    fn candidates_are_eight_uppercase_alphanumerics() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let n = candidate_order_number(&mut rng, Utc::now());
            assert!(is_well_formed(&n), "malformed order number: {n}");
        }
    }

    #[test]
    fn fallback_is_well_formed_and_time_derived() {
        let now = Utc::now();
        let n = timestamp_fallback(now);
        assert!(is_well_formed(&n));
        // Same microsecond, same fallback; later microsecond, different fallback.
        assert_eq!(n, timestamp_fallback(now));
        let later = now + chrono::Duration::microseconds(1);
        assert_ne!(n, timestamp_fallback(later));
    }

    #[test]
    fn candidates_rarely_collide_within_a_second() {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        let numbers: HashSet<String> =
            (0..1000).map(|_| candidate_order_number(&mut rng, now).0).collect();
        // 36^5 random suffixes; 1000 draws colliding more than a handful of times would indicate
        // a broken generator.
        assert!(numbers.len() > 990, "too many collisions: {}", 1000 - numbers.len());
    }
}
