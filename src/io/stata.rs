//! Stata `%tc` timestamp encoding, isolated per the design note in spec §9:
//! the dependency on a statistical tool's 1960-01-01 epoch lives in exactly
//! one place, with a unit test pinned to a known fixed point.

/// Seconds between the Unix epoch (1970-01-01) and the Stata `%tc` epoch
/// (1960-01-01), i.e. `unix_seconds_at(1960-01-01) = -315619200`.
const STATA_EPOCH_OFFSET_SECONDS: i64 = 315_619_200;

/// Encodes a Unix timestamp (seconds) as Stata `%tc` milliseconds.
pub fn encode_stata_tc(unix_seconds: i64) -> i64 {
    (unix_seconds + STATA_EPOCH_OFFSET_SECONDS) * 1000
}

/// Decodes Stata `%tc` milliseconds back to a Unix timestamp (seconds).
pub fn decode_stata_tc(stata_ms: i64) -> i64 {
    stata_ms / 1000 - STATA_EPOCH_OFFSET_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fixed_point_unix_epoch() {
        // 1970-01-01T00:00:00Z is 315,619,200,000 ms after 1960-01-01T00:00:00Z.
        assert_eq!(encode_stata_tc(0), 315_619_200_000);
        assert_eq!(decode_stata_tc(315_619_200_000), 0);
    }

    #[test]
    fn known_fixed_point_stata_epoch() {
        // 1960-01-01T00:00:00Z encodes to 0.
        assert_eq!(encode_stata_tc(-315_619_200), 0);
        assert_eq!(decode_stata_tc(0), -315_619_200);
    }

    #[test]
    fn round_trip_within_a_millisecond() {
        for unix_seconds in [-1_000_000_000_i64, 0, 1_700_000_000, 2_000_000_000] {
            let encoded = encode_stata_tc(unix_seconds);
            let decoded = decode_stata_tc(encoded);
            assert_eq!(decoded, unix_seconds);
        }
    }
}
