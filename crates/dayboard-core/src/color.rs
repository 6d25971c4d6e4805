//! Deterministic event colors.
//!
//! Every event is painted with one entry of a fixed 12-color palette. The
//! entry is picked by hashing the upstream event id, so a recurring event keeps
//! its color across refreshes, restarts and clients.
//!
//! The hash reproduces the rolling string hash the web front end has always
//! used (`hash = c + ((hash << 5) - hash)` over UTF-16 code units, evaluated
//! with JavaScript number semantics). Colors computed here and colors computed
//! by older clients therefore agree bit-for-bit.

/// The display palette, in index order.
pub const PALETTE: [&str; 12] = [
    "bg-blue-500",
    "bg-purple-500",
    "bg-pink-500",
    "bg-red-500",
    "bg-orange-500",
    "bg-yellow-500",
    "bg-green-500",
    "bg-teal-500",
    "bg-cyan-500",
    "bg-indigo-500",
    "bg-violet-500",
    "bg-rose-500",
];

/// Computes the raw rolling hash of an id.
///
/// The left shift operates on the value wrapped to a signed 32-bit integer,
/// while the subtraction and addition keep the full integer, exactly like
/// `charCodeAt(i) + ((hash << 5) - hash)` does on a JavaScript number. The
/// result can therefore leave the `i32` range.
pub fn id_hash(id: &str) -> i64 {
    id.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit).wrapping_add(shifted.wrapping_sub(hash))
    })
}

/// Returns the palette index for an event id.
pub fn color_index(id: &str) -> usize {
    (id_hash(id).unsigned_abs() % PALETTE.len() as u64) as usize
}

/// Returns the palette entry for an event id.
pub fn color_of(id: &str) -> &'static str {
    PALETTE[color_index(id)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_hash_to_known_indices() {
        assert_eq!(id_hash("a1"), 3056);
        assert_eq!(color_index("a1"), 8);
        assert_eq!(color_of("a1"), "bg-cyan-500");

        assert_eq!(id_hash("b2"), 3088);
        assert_eq!(color_index("b2"), 4);
        assert_eq!(color_of("b2"), "bg-orange-500");
    }

    #[test]
    fn empty_id_uses_first_color() {
        assert_eq!(id_hash(""), 0);
        assert_eq!(color_of(""), "bg-blue-500");
    }

    #[test]
    fn negative_hash_uses_absolute_value() {
        assert_eq!(id_hash("event1"), -1_291_329_321);
        assert_eq!(color_of("event1"), "bg-indigo-500");
    }

    #[test]
    fn hash_leaves_i32_range_like_the_web_client() {
        // Values below were produced by the JavaScript implementation.
        assert_eq!(id_hash("team-sync-weekly"), 6_424_456_323);
        assert_eq!(color_of("team-sync-weekly"), "bg-red-500");

        let recurring = "3q2k7v1d9a8m0c5rjf4l6h2p0s_20241015T090000Z";
        assert_eq!(id_hash(recurring), -9_378_125_598);
        assert_eq!(color_of(recurring), "bg-green-500");
    }

    #[test]
    fn hashes_utf16_code_units() {
        assert_eq!(id_hash("caf\u{e9}"), 3_045_921);
        assert_eq!(color_index("caf\u{e9}"), 9);
        // Astral characters contribute two surrogate units.
        let id = "\u{65e5}\u{672c}\u{8a9e}\u{1f5d3}\u{fe0f}";
        assert_eq!(id_hash(id), -798_485_854);
        assert_eq!(color_of(id), "bg-violet-500");
    }

    #[test]
    fn color_is_stable_and_in_palette() {
        for id in ["x", "abc", "abcdefghijklmnopqrstuvwxyz0123456789", "_"] {
            let first = color_of(id);
            assert_eq!(first, color_of(id));
            assert!(PALETTE.contains(&first));
        }
        assert_eq!(color_of("abcdefghijklmnopqrstuvwxyz0123456789"), "bg-pink-500");
    }
}
