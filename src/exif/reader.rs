use anyhow::Result;
use nom_exif::*;
use std::io::Cursor;

use super::scan;
use crate::capture::RawImage;
use crate::coords::{Hemisphere, to_decimal_degrees};
use crate::location::Coordinates;

/// GPS position and capture timestamp recovered from embedded metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsMetadata {
    pub coordinates: Option<Coordinates>,
    /// EXIF `DateTimeOriginal`, falling back to `ModifyDate`.
    pub timestamp: Option<String>,
}

/// Extract GPS coordinates and the capture timestamp from an image.
///
/// Never fails: a parse error, missing tag group, or malformed rational
/// yields absent fields. Partial GPS data (one axis resolved, or a
/// missing hemisphere letter) is reported as no coordinates at all.
/// When the primary parser cannot handle the container or finds no GPS
/// group, the low-level byte scan gets a chance.
pub fn extract(image: &RawImage) -> GpsMetadata {
    let mut metadata = match parse_container(image) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::debug!("No parseable metadata in {} buffer: {e}", image.mime);
            GpsMetadata::default()
        }
    };
    if metadata.coordinates.is_none() {
        metadata.coordinates = scan::scan_gps(&image.bytes);
    }
    metadata
}

fn parse_container(image: &RawImage) -> Result<GpsMetadata> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::seekable(Cursor::new(image.bytes.as_slice()))?;
    let iter: ExifIter = parser.parse(ms)?;

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let timestamp = exif
        .get(ExifTag::DateTimeOriginal)
        .and_then(entry_to_string)
        .or_else(|| exif.get(ExifTag::ModifyDate).and_then(entry_to_string));

    Ok(GpsMetadata {
        coordinates: gps_info.as_ref().and_then(convert_gps),
        timestamp,
    })
}

fn convert_gps(gps: &GPSInfo) -> Option<Coordinates> {
    let latitude = axis_to_decimal(&gps.latitude, gps.latitude_ref)?;
    let longitude = axis_to_decimal(&gps.longitude, gps.longitude_ref)?;
    Some(Coordinates::new(latitude, longitude))
}

/// Convert a (degrees, minutes, seconds) rational triple plus reference
/// letter to decimal degrees. An unknown reference or degenerate rational
/// drops the whole axis so the pair invariant holds upstream.
fn axis_to_decimal(latlng: &LatLng, reference: char) -> Option<f64> {
    let hemisphere = Hemisphere::from_ref(reference)?;
    let degrees = rational(&latlng.0)?;
    let minutes = rational(&latlng.1)?;
    let seconds = rational(&latlng.2)?;
    Some(to_decimal_degrees(degrees, minutes, seconds, hemisphere))
}

fn rational(value: &URational) -> Option<f64> {
    if value.1 == 0 {
        return None;
    }
    Some(value.0 as f64 / value.1 as f64)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(value: &EntryValue) -> Option<String> {
    let s = value.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}
