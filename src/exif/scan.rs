//! Low-level GPS scan for containers the primary parser cannot handle.
//!
//! Walks the raw byte buffer for an embedded TIFF block (the `Exif\0\0`
//! marker used by JPEG APP1 and HEIC, or a bare TIFF header), then reads
//! the GPS sub-IFD directly. Every read is bounds-checked; anything
//! unexpected yields `None`, never a panic.

use crate::coords::{Hemisphere, to_decimal_degrees};
use crate::location::Coordinates;

const EXIF_MARKER: &[u8] = b"Exif\0\0";

const TAG_GPS_SUB_IFD: u16 = 0x8825;
const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
const TAG_GPS_LATITUDE: u16 = 0x0002;
const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
const TAG_GPS_LONGITUDE: u16 = 0x0004;

const TYPE_ASCII: u16 = 2;
const TYPE_RATIONAL: u16 = 5;

#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

/// Scan a raw byte buffer for an embedded GPS tag group.
///
/// Returns coordinates only when both axes resolve; partial GPS data is
/// never reported as a usable pair.
pub(crate) fn scan_gps(data: &[u8]) -> Option<Coordinates> {
    for start in tiff_candidates(data) {
        if let Some(coordinates) = parse_tiff(&data[start..]) {
            return Some(coordinates);
        }
    }
    None
}

/// Candidate TIFF block offsets: the buffer itself when it opens with a
/// TIFF header, plus the bytes following every `Exif\0\0` marker. A false
/// marker match inside compressed image data fails TIFF validation and is
/// skipped.
fn tiff_candidates(data: &[u8]) -> Vec<usize> {
    let mut candidates = Vec::new();
    if data.starts_with(b"II") || data.starts_with(b"MM") {
        candidates.push(0);
    }
    let mut offset = 0;
    while let Some(position) = find(&data[offset..], EXIF_MARKER) {
        candidates.push(offset + position + EXIF_MARKER.len());
        offset += position + EXIF_MARKER.len();
    }
    candidates
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn parse_tiff(tiff: &[u8]) -> Option<Coordinates> {
    let order = match tiff.get(..2)? {
        b"II" => ByteOrder::Little,
        b"MM" => ByteOrder::Big,
        _ => return None,
    };
    if read_u16(tiff, 2, order)? != 42 {
        return None;
    }
    let ifd0 = read_u32(tiff, 4, order)? as usize;
    let gps_ifd = find_gps_ifd(tiff, ifd0, order)? as usize;
    parse_gps_ifd(tiff, gps_ifd, order)
}

/// Walk IFD0 for the GPS sub-IFD pointer (tag 0x8825).
fn find_gps_ifd(tiff: &[u8], ifd: usize, order: ByteOrder) -> Option<u32> {
    let count = read_u16(tiff, ifd, order)? as usize;
    for index in 0..count {
        let entry = ifd.checked_add(2 + index * 12)?;
        if read_u16(tiff, entry, order)? == TAG_GPS_SUB_IFD {
            return read_u32(tiff, entry + 8, order);
        }
    }
    None
}

/// Read the four GPS sub-tags and convert to a decimal pair. All four
/// must be present and well-formed.
fn parse_gps_ifd(tiff: &[u8], ifd: usize, order: ByteOrder) -> Option<Coordinates> {
    let count = read_u16(tiff, ifd, order)? as usize;

    let mut lat_ref = None;
    let mut lat_dms = None;
    let mut lon_ref = None;
    let mut lon_dms = None;

    for index in 0..count {
        let entry = ifd.checked_add(2 + index * 12)?;
        let tag = read_u16(tiff, entry, order)?;
        let kind = read_u16(tiff, entry + 2, order)?;
        let components = read_u32(tiff, entry + 4, order)?;

        match tag {
            TAG_GPS_LATITUDE_REF if kind == TYPE_ASCII => {
                lat_ref = read_ref_letter(tiff, entry + 8);
            }
            TAG_GPS_LATITUDE if kind == TYPE_RATIONAL && components == 3 => {
                let offset = read_u32(tiff, entry + 8, order)? as usize;
                lat_dms = read_dms(tiff, offset, order);
            }
            TAG_GPS_LONGITUDE_REF if kind == TYPE_ASCII => {
                lon_ref = read_ref_letter(tiff, entry + 8);
            }
            TAG_GPS_LONGITUDE if kind == TYPE_RATIONAL && components == 3 => {
                let offset = read_u32(tiff, entry + 8, order)? as usize;
                lon_dms = read_dms(tiff, offset, order);
            }
            _ => {}
        }
    }

    let lat_hemisphere = Hemisphere::from_ref(lat_ref?)?;
    let lon_hemisphere = Hemisphere::from_ref(lon_ref?)?;
    let (lat_d, lat_m, lat_s) = lat_dms?;
    let (lon_d, lon_m, lon_s) = lon_dms?;

    Some(Coordinates::new(
        to_decimal_degrees(lat_d, lat_m, lat_s, lat_hemisphere),
        to_decimal_degrees(lon_d, lon_m, lon_s, lon_hemisphere),
    ))
}

/// An ASCII ref value fits in the entry's inline value field; the first
/// byte is the hemisphere letter.
fn read_ref_letter(tiff: &[u8], offset: usize) -> Option<char> {
    tiff.get(offset).map(|byte| *byte as char)
}

/// Three rationals (degrees, minutes, seconds) at `offset`.
fn read_dms(tiff: &[u8], offset: usize, order: ByteOrder) -> Option<(f64, f64, f64)> {
    let degrees = read_rational(tiff, offset, order)?;
    let minutes = read_rational(tiff, offset + 8, order)?;
    let seconds = read_rational(tiff, offset + 16, order)?;
    Some((degrees, minutes, seconds))
}

fn read_rational(tiff: &[u8], offset: usize, order: ByteOrder) -> Option<f64> {
    let numerator = read_u32(tiff, offset, order)?;
    let denominator = read_u32(tiff, offset + 4, order)?;
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

fn read_u16(data: &[u8], offset: usize, order: ByteOrder) -> Option<u16> {
    let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    })
}

fn read_u32(data: &[u8], offset: usize, order: ByteOrder) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Big => u32::from_be_bytes(bytes),
    })
}
