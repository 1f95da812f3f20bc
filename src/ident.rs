//! Identifier generation for bikes and bookings.
//!
//! Identifiers are a fixed prefix followed by random digits ("BIKE0042",
//! "BKG123456"). Generation retries against the caller's current set until
//! the id is unused, and widens the suffix if a width ever fills up.

use rand::Rng;

pub const BIKE_PREFIX: &str = "BIKE";
pub const BIKE_SUFFIX_LEN: usize = 4;
pub const BOOKING_PREFIX: &str = "BKG";
pub const BOOKING_SUFFIX_LEN: usize = 6;

/// Attempts per suffix width before adding another digit
const ATTEMPTS_PER_WIDTH: usize = 128;

/// Generate an id with the given prefix and suffix width that is not
/// already taken according to `taken`.
pub fn generate<F>(prefix: &str, suffix_len: usize, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut rng = rand::thread_rng();
    let mut width = suffix_len;

    loop {
        for _ in 0..ATTEMPTS_PER_WIDTH {
            let suffix: String = (0..width)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect();
            let id = format!("{}{}", prefix, suffix);
            if !taken(&id) {
                return id;
            }
        }
        width += 1;
    }
}

pub fn bike_id<F: Fn(&str) -> bool>(taken: F) -> String {
    generate(BIKE_PREFIX, BIKE_SUFFIX_LEN, taken)
}

pub fn booking_id<F: Fn(&str) -> bool>(taken: F) -> String {
    generate(BOOKING_PREFIX, BOOKING_SUFFIX_LEN, taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_shape() {
        let id = bike_id(|_| false);
        assert!(id.starts_with("BIKE"));
        assert_eq!(id.len(), "BIKE".len() + 4);
        assert!(id["BIKE".len()..].chars().all(|c| c.is_ascii_digit()));

        let id = booking_id(|_| false);
        assert!(id.starts_with("BKG"));
        assert_eq!(id.len(), "BKG".len() + 6);
    }

    #[test]
    fn test_retries_until_unique() {
        // Reject the first two candidates, accept the third.
        let rejected = std::cell::RefCell::new(0usize);
        let id = generate("X", 2, |_| {
            let mut n = rejected.borrow_mut();
            *n += 1;
            *n <= 2
        });
        assert_eq!(*rejected.borrow(), 3);
        assert!(id.starts_with('X'));
    }

    #[test]
    fn test_widens_when_width_exhausted() {
        // Every 1-digit suffix is taken, so the generator must widen.
        let taken: HashSet<String> = (0..10).map(|d| format!("X{}", d)).collect();
        let id = generate("X", 1, |candidate| taken.contains(candidate));
        assert!(id.len() > 2);
    }
}
