//! UTF-16 conversions for Win32 string parameters

use std::ffi::{OsStr, OsString};
use std::os::windows::ffi::{OsStrExt, OsStringExt};

/// Converts to a null-terminated UTF-16 string
pub fn string_to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Converts a UTF-16 buffer, stopping at the first null
pub fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    OsString::from_wide(&wide[..len])
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_non_ascii_title() {
        let wide = string_to_wide("月圆之夜");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide_to_string(&wide), "月圆之夜");
    }

    #[test]
    fn test_wide_to_string_stops_at_null() {
        let wide = [0x47, 0x41, 0, 0x58];
        assert_eq!(wide_to_string(&wide), "GA");
        assert_eq!(wide_to_string(&[0x47, 0x41]), "GA");
    }
}
