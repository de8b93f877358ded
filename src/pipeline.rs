//! Location reconciler: one canonical record out of whatever sources an
//! acquisition path offers.
//!
//! Three paths exist — upload with metadata extraction, upload with
//! manual entry, and camera capture with the device sensor. Each resolves
//! into a [`Resolution`]: the updated record, the stage the flow should
//! move to, and an optional reportable note. Enrichment (reverse
//! geocoding) only ever runs after a coordinate pair is known.

use anyhow::{Result, bail};
use std::fmt;

use crate::capture::{GeoSensor, RawImage};
use crate::exif;
use crate::geocode::ReverseGeocoder;
use crate::location::LocationRecord;

/// The pipeline's user-visible stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Acquire an image (upload or camera).
    Capture,
    /// Resolve or hand-enter location data.
    Location,
    /// Style and render the annotation.
    Annotate,
}

/// Reportable, non-fatal conditions. None of these abort the flow; they
/// are surfaced to the user while the pipeline continues, usually into
/// manual entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// The image carries no usable GPS tag group.
    NoGpsData,
    /// Coordinates resolved but the address lookup came back empty.
    EnrichmentUnavailable,
    /// The device sensor failed or was denied.
    SensorUnavailable(String),
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGpsData => write!(
                f,
                "No GPS data found in this image. You can enter location information manually."
            ),
            Self::EnrichmentUnavailable => write!(
                f,
                "Could not retrieve address information from coordinates. You can enter it manually."
            ),
            Self::SensorUnavailable(reason) => write!(
                f,
                "Could not get your current location ({reason}). You can enter it manually."
            ),
        }
    }
}

/// Outcome of one acquisition path.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: LocationRecord,
    /// Where the flow goes next: [`Stage::Annotate`] exactly when the
    /// record holds a coordinate pair, [`Stage::Location`] otherwise.
    pub next: Stage,
    pub note: Option<Note>,
}

/// Orchestrates metadata extraction, the device sensor, and geocoding
/// enrichment into one canonical [`LocationRecord`].
pub struct Reconciler {
    geocoder: Box<dyn ReverseGeocoder>,
}

impl Reconciler {
    pub fn new(geocoder: Box<dyn ReverseGeocoder>) -> Self {
        Self { geocoder }
    }

    /// Upload path, metadata extraction.
    ///
    /// With a resolved pair the flow advances to annotation even if
    /// enrichment comes back empty; without one the user is sent to
    /// manual entry.
    pub async fn resolve_from_image(&self, image: &RawImage) -> Resolution {
        let metadata = exif::extract(image);
        let mut record = LocationRecord { timestamp: metadata.timestamp, ..Default::default() };

        match metadata.coordinates {
            Some(coordinates) => {
                record.coordinates = Some(coordinates);
                let note = self.enrich(&mut record).await;
                Resolution { record, next: Stage::Annotate, note }
            }
            None => {
                log::info!("No GPS tag group in uploaded image");
                Resolution { record, next: Stage::Location, note: Some(Note::NoGpsData) }
            }
        }
    }

    /// Upload path, manual entry.
    ///
    /// The two coordinate strings must parse as decimal numbers before
    /// any geocoding is permitted; otherwise the call fails and the
    /// caller's record is untouched. Address fields already entered by
    /// hand survive enrichment unless the lookup resolves them anew.
    pub async fn resolve_manual(
        &self,
        record: &LocationRecord,
        latitude: &str,
        longitude: &str,
    ) -> Result<Resolution> {
        let latitude = parse_coordinate(latitude)?;
        let longitude = parse_coordinate(longitude)?;

        let mut record = record.clone();
        record.set_coordinates(latitude, longitude);
        let note = self.enrich(&mut record).await;
        Ok(Resolution { record, next: Stage::Annotate, note })
    }

    /// Camera path, device sensor.
    ///
    /// A successful read proceeds straight to annotation; a sensor
    /// failure is reportable but non-fatal and drops back to manual
    /// entry.
    pub async fn resolve_from_sensor(&self, sensor: &dyn GeoSensor) -> Resolution {
        match sensor.current_position().await {
            Ok(coordinates) => {
                let mut record =
                    LocationRecord { coordinates: Some(coordinates), ..Default::default() };
                let note = self.enrich(&mut record).await;
                Resolution { record, next: Stage::Annotate, note }
            }
            Err(e) => {
                log::warn!("Device sensor read failed: {e:#}");
                Resolution {
                    record: LocationRecord::new(),
                    next: Stage::Location,
                    note: Some(Note::SensorUnavailable(e.to_string())),
                }
            }
        }
    }

    /// Address enrichment for a record whose pair is already resolved.
    /// An empty lookup is "enrichment unavailable", reported but never
    /// fatal.
    async fn enrich(&self, record: &mut LocationRecord) -> Option<Note> {
        let coordinates = record.coordinates?;
        let address = self.geocoder.reverse_geocode(coordinates).await;
        if address.is_empty() {
            return Some(Note::EnrichmentUnavailable);
        }
        record.address.apply(address);
        None
    }
}

/// Manual coordinate entry must be a plain finite decimal number.
fn parse_coordinate(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => bail!("Invalid coordinates: {trimmed:?} is not a decimal number"),
    }
}
