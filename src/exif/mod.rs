//! Image metadata extraction.
//!
//! [`extract`] recovers GPS coordinates and the capture timestamp from an
//! image's embedded metadata. The primary parser handles the common
//! containers; a low-level byte scan ([`scan`]) covers streams it cannot.
//! Extraction never fails — anything unreadable yields an empty result.

mod reader;
mod scan;

pub use reader::{GpsMetadata, extract};
