//! # geostamp
//!
//! Stamp GPS location onto photos: extract coordinates from an image's
//! embedded EXIF metadata (or a device sensor, or manual entry), enrich
//! them into an address via reverse geocoding, and burn the result into
//! the pixels as styled text over a semi-transparent banner.
//!
//! ## Quick Start
//!
//! The pipeline has three stages — capture, location, annotate. The
//! [`pipeline::Reconciler`] turns whatever a capture path offers into one
//! canonical [`location::LocationRecord`] and decides which stage comes
//! next; the [`annotate`] module renders the record onto the image:
//!
//! ```rust,no_run
//! use geostamp::annotate::{AnnotationStyle, compose};
//! use geostamp::capture::RawImage;
//! use geostamp::geocode::NominatimClient;
//! use geostamp::pipeline::{Reconciler, Stage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     let image = RawImage::from_upload(bytes, "image/jpeg")?;
//!
//!     let reconciler = Reconciler::new(Box::new(NominatimClient::new()));
//!     let resolution = reconciler.resolve_from_image(&image).await;
//!
//!     if let Some(note) = &resolution.note {
//!         eprintln!("{note}");
//!     }
//!
//!     if resolution.next == Stage::Annotate {
//!         let annotated = compose(&image, &resolution.record, &AnnotationStyle::default())?;
//!         annotated.write_to(geostamp::annotate::DEFAULT_FILENAME.as_ref())?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Manual entry and the camera path work the same way through
//! [`pipeline::Reconciler::resolve_manual`] and
//! [`pipeline::Reconciler::resolve_from_sensor`]; see [`capture`] for the
//! capability traits an embedding shell implements over its camera and
//! geolocation devices.
//!
//! ## Modules
//!
//! - [`coords`] — DMS to decimal-degree conversion
//! - [`exif`] — GPS and timestamp extraction from embedded metadata
//! - [`geocode`] — reverse-geocoding adapter (Nominatim by default)
//! - [`location`] — the canonical location record
//! - [`capture`] — upload boundary and camera/sensor capability traits
//! - [`annotate`] — banner/text compositing and JPEG re-encoding
//! - [`pipeline`] — the reconciler tying the stages together

pub mod annotate;
pub mod capture;
pub mod coords;
pub mod exif;
pub mod geocode;
pub mod location;
pub mod pipeline;
