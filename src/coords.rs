//! Degrees/minutes/seconds to decimal-degree conversion.

/// Hemisphere indicator attached to a DMS coordinate.
///
/// Derived from the EXIF `GPSLatitudeRef` / `GPSLongitudeRef` letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Map an EXIF reference letter to a hemisphere. Accepts lowercase.
    pub fn from_ref(reference: char) -> Option<Self> {
        match reference.to_ascii_uppercase() {
            'N' => Some(Self::North),
            'S' => Some(Self::South),
            'E' => Some(Self::East),
            'W' => Some(Self::West),
            _ => None,
        }
    }

    /// South and West coordinates carry a negative sign in decimal form.
    pub fn negates(self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

/// Convert a DMS coordinate plus hemisphere into signed decimal degrees.
///
/// `degrees + minutes/60 + seconds/3600`, negated for South/West.
/// No clamping, no rounding.
pub fn to_decimal_degrees(degrees: f64, minutes: f64, seconds: f64, hemisphere: Hemisphere) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    if hemisphere.negates() { -decimal } else { decimal }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── to_decimal_degrees ───────────────────────────────────────────

    #[test]
    fn textbook_conversion() {
        let dd = to_decimal_degrees(40.0, 30.0, 0.0, Hemisphere::North);
        assert!((dd - 40.5).abs() < 1e-9);
    }

    #[test]
    fn bangkok_latitude() {
        let dd = to_decimal_degrees(13.0, 45.0, 30.0, Hemisphere::North);
        assert!((dd - 13.758_333_333_333_333).abs() < 1e-9);
    }

    #[test]
    fn bangkok_longitude() {
        let dd = to_decimal_degrees(100.0, 30.0, 15.0, Hemisphere::East);
        assert!((dd - 100.504_166_666_666_67).abs() < 1e-9);
    }

    #[test]
    fn south_and_west_are_negative() {
        assert!(to_decimal_degrees(33.0, 51.0, 35.9, Hemisphere::South) < 0.0);
        assert!(to_decimal_degrees(70.0, 40.0, 12.0, Hemisphere::West) < 0.0);
    }

    #[test]
    fn north_and_east_are_non_negative() {
        assert!(to_decimal_degrees(0.0, 0.0, 0.0, Hemisphere::North) >= 0.0);
        assert!(to_decimal_degrees(100.0, 30.0, 15.0, Hemisphere::East) >= 0.0);
    }

    #[test]
    fn zero_minutes_and_seconds() {
        let dd = to_decimal_degrees(51.0, 0.0, 0.0, Hemisphere::North);
        assert!((dd - 51.0).abs() < 1e-9);
    }

    // ── Hemisphere::from_ref ─────────────────────────────────────────

    #[test]
    fn from_ref_uppercase() {
        assert_eq!(Hemisphere::from_ref('N'), Some(Hemisphere::North));
        assert_eq!(Hemisphere::from_ref('S'), Some(Hemisphere::South));
        assert_eq!(Hemisphere::from_ref('E'), Some(Hemisphere::East));
        assert_eq!(Hemisphere::from_ref('W'), Some(Hemisphere::West));
    }

    #[test]
    fn from_ref_lowercase() {
        assert_eq!(Hemisphere::from_ref('n'), Some(Hemisphere::North));
        assert_eq!(Hemisphere::from_ref('w'), Some(Hemisphere::West));
    }

    #[test]
    fn from_ref_invalid() {
        assert_eq!(Hemisphere::from_ref('X'), None);
        assert_eq!(Hemisphere::from_ref('0'), None);
        assert_eq!(Hemisphere::from_ref(' '), None);
    }
}
