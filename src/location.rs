//! The canonical location record flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// A resolved coordinate pair in decimal degrees.
///
/// Latitude and longitude only ever travel together: a source that can
/// produce one axis but not the other yields no `Coordinates` at all, so a
/// half-resolved pair is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Address breakdown produced by reverse geocoding or manual entry.
///
/// Each field is independently `None` until resolved. An empty string is
/// never stored — unresolved means `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub postal_code: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
}

impl Address {
    /// True when no field is resolved. An all-empty address is what an
    /// absorbed geocoding failure looks like to callers.
    pub fn is_empty(&self) -> bool {
        self.postal_code.is_none()
            && self.province.is_none()
            && self.district.is_none()
            && self.sub_district.is_none()
    }

    /// Overlay `update` onto this address, field by field. Fields the
    /// update did not resolve are left untouched, so a failed enrichment
    /// never erases earlier values.
    pub fn apply(&mut self, update: Address) {
        if update.postal_code.is_some() {
            self.postal_code = update.postal_code;
        }
        if update.province.is_some() {
            self.province = update.province;
        }
        if update.district.is_some() {
            self.district = update.district;
        }
        if update.sub_district.is_some() {
            self.sub_district = update.sub_district;
        }
    }
}

/// The canonical record assembled by the reconciler and consumed by the
/// annotation compositor.
///
/// Created empty at pipeline start, populated incrementally by metadata
/// extraction, the device sensor, geocoding enrichment, and manual edits.
/// Every field is last-write-wins: a later manual edit silently replaces
/// an earlier automatic value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub coordinates: Option<Coordinates>,
    pub address: Address,
    /// Capture timestamp carried over from image metadata, in the EXIF
    /// `YYYY:MM:DD HH:MM:SS` form. Not rendered by the compositor.
    pub timestamp: Option<String>,
}

impl LocationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The advancement gate: the pipeline moves to the annotation stage
    /// only when a coordinate pair is resolved. Address fields never gate
    /// advancement.
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── LocationRecord ───────────────────────────────────────────────

    #[test]
    fn new_record_is_empty() {
        let record = LocationRecord::new();
        assert!(record.coordinates.is_none());
        assert!(record.address.is_empty());
        assert!(record.timestamp.is_none());
        assert!(!record.has_coordinates());
    }

    #[test]
    fn set_coordinates_resolves_the_pair() {
        let mut record = LocationRecord::new();
        record.set_coordinates(13.75, 100.50);
        assert!(record.has_coordinates());
        let coords = record.coordinates.unwrap();
        assert!((coords.latitude - 13.75).abs() < 1e-9);
        assert!((coords.longitude - 100.50).abs() < 1e-9);
    }

    #[test]
    fn later_writes_override_earlier_values() {
        let mut record = LocationRecord::new();
        record.set_coordinates(13.75, 100.50);
        record.address.province = Some("Bangkok".into());

        // Manual edits replace automatic values with no merge conflict.
        record.set_coordinates(51.5, -0.12);
        record.address.province = Some("London".into());

        assert_eq!(record.coordinates.unwrap().longitude, -0.12);
        assert_eq!(record.address.province.as_deref(), Some("London"));
    }

    // ── Address::apply ───────────────────────────────────────────────

    #[test]
    fn apply_fills_resolved_fields() {
        let mut address = Address::default();
        address.apply(Address {
            postal_code: Some("10110".into()),
            province: Some("Bangkok".into()),
            ..Default::default()
        });
        assert_eq!(address.postal_code.as_deref(), Some("10110"));
        assert_eq!(address.province.as_deref(), Some("Bangkok"));
        assert!(address.district.is_none());
    }

    #[test]
    fn apply_keeps_existing_when_update_is_unresolved() {
        let mut address = Address {
            province: Some("Bangkok".into()),
            ..Default::default()
        };
        address.apply(Address::default());
        assert_eq!(address.province.as_deref(), Some("Bangkok"));
    }

    #[test]
    fn apply_overwrites_existing_with_resolved_update() {
        let mut address = Address {
            district: Some("Old Town".into()),
            ..Default::default()
        };
        address.apply(Address {
            district: Some("Watthana".into()),
            ..Default::default()
        });
        assert_eq!(address.district.as_deref(), Some("Watthana"));
    }

    #[test]
    fn empty_address_reports_empty() {
        assert!(Address::default().is_empty());
        let address = Address {
            sub_district: Some("Khlong Toei".into()),
            ..Default::default()
        };
        assert!(!address.is_empty());
    }
}
