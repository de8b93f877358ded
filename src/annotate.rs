//! Annotation compositor: burn a location record into an image as text
//! over a semi-transparent banner, then re-encode as JPEG.
//!
//! Composition is a pure function of `(image, record, style)` — a style
//! change recomputes the whole output rather than patching it, and
//! identical inputs produce byte-identical output.

use ab_glyph::{FontRef, PxScale};
use anyhow::{Context, Result, anyhow, bail};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::capture::RawImage;
use crate::location::LocationRecord;

static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Fixed filename the annotated output is saved under.
pub const DEFAULT_FILENAME: &str = "annotated-image.jpg";

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 50;

const PADDING: u32 = 10;
const LINE_SPACING: f32 = 1.2;
const JPEG_QUALITY: u8 = 90;

/// The fixed annotation text palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextColor {
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
}

impl TextColor {
    fn rgb(self) -> Rgb<u8> {
        match self {
            Self::White => Rgb([255, 255, 255]),
            Self::Black => Rgb([0, 0, 0]),
            Self::Red => Rgb([255, 0, 0]),
            Self::Green => Rgb([0, 255, 0]),
            Self::Blue => Rgb([0, 0, 255]),
            Self::Yellow => Rgb([255, 255, 0]),
        }
    }
}

/// Which edge of the image the banner is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Top,
    Bottom,
}

/// Rendering configuration for one annotation pass. Session-scoped, not
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    font_size_px: u32,
    color: TextColor,
    position: Position,
}

impl AnnotationStyle {
    /// Font size outside 10–50 px is rejected at the boundary.
    pub fn new(font_size_px: u32, color: TextColor, position: Position) -> Result<Self> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size_px) {
            bail!("Font size must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE} pixels");
        }
        Ok(Self { font_size_px, color, position })
    }

    pub fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub fn color(&self) -> TextColor {
        self.color
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self { font_size_px: 20, color: TextColor::White, position: Position::Bottom }
    }
}

/// The composited output: JPEG bytes derived from
/// `(RawImage, LocationRecord, AnnotationStyle)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedImage {
    bytes: Vec<u8>,
}

impl AnnotatedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// `data:image/jpeg;base64,...` form, for handing to a shell that
    /// displays or downloads the result client-side.
    pub fn to_data_url(&self) -> String {
        let encoded =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &self.bytes);
        format!("data:image/jpeg;base64,{encoded}")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("Failed to save {}", path.display()))
    }
}

/// Composite `record` onto `image` and re-encode.
///
/// An empty record produces zero text lines and no banner — the output is
/// just the re-encoded source. Decode or encode failure is a terminal
/// error for this single attempt; no partial output is emitted.
pub fn compose(
    image: &RawImage,
    record: &LocationRecord,
    style: &AnnotationStyle,
) -> Result<AnnotatedImage> {
    let decoded = image::load_from_memory(&image.bytes).context("Could not annotate the image")?;
    let mut canvas = decoded.to_rgb8();

    let lines = location_lines(record);
    if !lines.is_empty() {
        paint_banner(&mut canvas, &lines, style)?;
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&canvas)
        .context("Could not annotate the image")?;
    Ok(AnnotatedImage { bytes })
}

/// Ordered text lines for a record. A line is omitted when its value is
/// empty or whitespace; the coordinate line appears whenever the record
/// holds a resolved pair.
fn location_lines(record: &LocationRecord) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(coordinates) = record.coordinates {
        lines.push(format!(
            "Lat: {:.6}, Long: {:.6}",
            coordinates.latitude, coordinates.longitude
        ));
    }
    push_field(&mut lines, "Postal Code", &record.address.postal_code);
    push_field(&mut lines, "Province", &record.address.province);
    push_field(&mut lines, "District", &record.address.district);
    push_field(&mut lines, "Sub-district", &record.address.sub_district);
    lines
}

fn push_field(lines: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        if !value.is_empty() {
            lines.push(format!("{label}: {value}"));
        }
    }
}

/// Darken the banner strip to 50 % and draw the text block over it.
fn paint_banner(canvas: &mut RgbImage, lines: &[String], style: &AnnotationStyle) -> Result<()> {
    let font =
        FontRef::try_from_slice(FONT_BYTES).map_err(|_| anyhow!("bundled font failed to load"))?;
    let (width, height) = canvas.dimensions();

    let line_height = style.font_size_px() as f32 * LINE_SPACING;
    let text_height = line_height * lines.len() as f32;
    let banner_height = ((text_height + (PADDING * 2) as f32).ceil() as u32).min(height);
    let banner_top = match style.position() {
        Position::Top => 0,
        Position::Bottom => height - banner_height,
    };

    // 50 %-opacity black over the strip
    for y in banner_top..banner_top + banner_height {
        for x in 0..width {
            let pixel = canvas.get_pixel_mut(x, y);
            pixel.0 = [pixel.0[0] / 2, pixel.0[1] / 2, pixel.0[2] / 2];
        }
    }

    let scale = PxScale::from(style.font_size_px() as f32);
    let color = style.color().rgb();
    for (index, line) in lines.iter().enumerate() {
        let y = banner_top as f32 + PADDING as f32 + index as f32 * line_height;
        draw_text_mut(canvas, color, PADDING as i32, y.round() as i32, scale, &font, line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Address;

    fn sample_image(width: u32, height: u32, luma: u8) -> RawImage {
        let canvas = RgbImage::from_pixel(width, height, Rgb([luma, luma, luma]));
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 95).encode_image(&canvas).unwrap();
        RawImage::camera_frame(bytes)
    }

    fn record_with_coordinates() -> LocationRecord {
        let mut record = LocationRecord::new();
        record.set_coordinates(13.75, 100.50);
        record
    }

    fn full_record() -> LocationRecord {
        LocationRecord {
            coordinates: Some(crate::location::Coordinates::new(13.75, 100.50)),
            address: Address {
                postal_code: Some("10110".into()),
                province: Some("Bangkok".into()),
                district: Some("Watthana".into()),
                sub_district: Some("Khlong Toei".into()),
            },
            timestamp: None,
        }
    }

    // ── location_lines ───────────────────────────────────────────────

    #[test]
    fn empty_record_produces_no_lines() {
        assert!(location_lines(&LocationRecord::new()).is_empty());
    }

    #[test]
    fn coordinates_only_produce_exactly_one_line() {
        let lines = location_lines(&record_with_coordinates());
        assert_eq!(lines, vec!["Lat: 13.750000, Long: 100.500000"]);
    }

    #[test]
    fn full_record_produces_all_five_lines() {
        let lines = location_lines(&full_record());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "Postal Code: 10110");
        assert_eq!(lines[2], "Province: Bangkok");
        assert_eq!(lines[3], "District: Watthana");
        assert_eq!(lines[4], "Sub-district: Khlong Toei");
    }

    #[test]
    fn whitespace_only_value_is_omitted() {
        let mut record = record_with_coordinates();
        record.address.province = Some("   ".into());
        record.address.district = Some("Watthana".into());
        let lines = location_lines(&record);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "District: Watthana");
    }

    #[test]
    fn address_lines_render_without_coordinates() {
        let mut record = LocationRecord::new();
        record.address.postal_code = Some("10110".into());
        let lines = location_lines(&record);
        assert_eq!(lines, vec!["Postal Code: 10110"]);
    }

    // ── compose ──────────────────────────────────────────────────────

    #[test]
    fn empty_record_composes_without_banner() {
        let image = sample_image(64, 48, 255);
        let annotated =
            compose(&image, &LocationRecord::new(), &AnnotationStyle::default()).unwrap();

        let output = image::load_from_memory(annotated.bytes()).unwrap().to_rgb8();
        assert_eq!(output.dimensions(), (64, 48));
        // No banner anywhere: the white source stays bright top to bottom.
        assert!(output.get_pixel(2, 2).0[0] > 200);
        assert!(output.get_pixel(2, 45).0[0] > 200);
    }

    #[test]
    fn output_dimensions_match_source() {
        let image = sample_image(120, 80, 255);
        let annotated =
            compose(&image, &full_record(), &AnnotationStyle::default()).unwrap();
        let output = image::load_from_memory(annotated.bytes()).unwrap();
        assert_eq!(output.width(), 120);
        assert_eq!(output.height(), 80);
    }

    #[test]
    fn composition_is_deterministic() {
        let image = sample_image(64, 64, 255);
        let record = full_record();
        let style = AnnotationStyle::default();
        let first = compose(&image, &record, &style).unwrap();
        let second = compose(&image, &record, &style).unwrap();
        assert_eq!(first.bytes(), second.bytes());
    }

    #[test]
    fn top_banner_darkens_the_top_edge() {
        let image = sample_image(200, 200, 255);
        let style =
            AnnotationStyle::new(20, TextColor::White, Position::Top).unwrap();
        let annotated = compose(&image, &record_with_coordinates(), &style).unwrap();

        let output = image::load_from_memory(annotated.bytes()).unwrap().to_rgb8();
        // Banner height = 20 * 1.2 + 20 = 44px; sample inside and below it,
        // away from the glyphs.
        assert!(output.get_pixel(195, 2).0[0] < 180);
        assert!(output.get_pixel(195, 100).0[0] > 200);
    }

    #[test]
    fn bottom_banner_darkens_the_bottom_edge() {
        let image = sample_image(200, 200, 255);
        let style =
            AnnotationStyle::new(20, TextColor::White, Position::Bottom).unwrap();
        let annotated = compose(&image, &record_with_coordinates(), &style).unwrap();

        let output = image::load_from_memory(annotated.bytes()).unwrap().to_rgb8();
        assert!(output.get_pixel(195, 2).0[0] > 200);
        assert!(output.get_pixel(195, 197).0[0] < 180);
    }

    #[test]
    fn banner_taller_than_image_is_clamped() {
        let image = sample_image(40, 16, 255);
        let style = AnnotationStyle::new(50, TextColor::White, Position::Bottom).unwrap();
        // Five lines at 50px would dwarf a 16px image; must not panic.
        assert!(compose(&image, &full_record(), &style).is_ok());
    }

    #[test]
    fn undecodable_image_is_a_terminal_error() {
        let image = RawImage::camera_frame(vec![0x00, 0x01, 0x02, 0x03]);
        assert!(compose(&image, &full_record(), &AnnotationStyle::default()).is_err());
    }

    // ── AnnotationStyle ──────────────────────────────────────────────

    #[test]
    fn font_size_bounds_are_enforced() {
        assert!(AnnotationStyle::new(9, TextColor::White, Position::Top).is_err());
        assert!(AnnotationStyle::new(51, TextColor::White, Position::Top).is_err());
        assert!(AnnotationStyle::new(10, TextColor::White, Position::Top).is_ok());
        assert!(AnnotationStyle::new(50, TextColor::White, Position::Top).is_ok());
    }

    #[test]
    fn default_style_matches_initial_ui_state() {
        let style = AnnotationStyle::default();
        assert_eq!(style.font_size_px(), 20);
        assert_eq!(style.color(), TextColor::White);
        assert_eq!(style.position(), Position::Bottom);
    }

    // ── AnnotatedImage ───────────────────────────────────────────────

    #[test]
    fn data_url_is_jpeg_base64() {
        let image = sample_image(32, 32, 128);
        let annotated =
            compose(&image, &LocationRecord::new(), &AnnotationStyle::default()).unwrap();
        let url = annotated.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert!(url.len() > 30);
    }

    #[test]
    fn write_to_saves_the_jpeg() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILENAME);

        let image = sample_image(32, 32, 128);
        let annotated =
            compose(&image, &LocationRecord::new(), &AnnotationStyle::default()).unwrap();
        annotated.write_to(&path).unwrap();

        let saved = std::fs::read(&path).unwrap();
        assert_eq!(saved, annotated.bytes());
    }
}
