//! Annotated copy of an uploaded image: one coloured box per face plus a
//! short label block drawn directly above it.
//!
//! Label placement does not account for the canvas edge. For faces near the
//! top the label lands partly or wholly off the image and the drawing
//! routines simply clip it.

use crate::glyphs;
use crate::report::{BoxColor, FaceSummary};
use crate::types::FaceDetail;
use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

const BOX_STROKE: i32 = 3;
const LABEL_WIDTH: i32 = 150;
const LABEL_HEIGHT: i32 = 80;
const LABEL_PADDING: i32 = 5;
const LABEL_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const TTF_SIZE: f32 = 18.0;
const TTF_LINE_HEIGHT: i32 = 18;
const BITMAP_SCALE: i32 = 2;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to read font {path}: {source}")]
    FontRead {
        path: String,
        source: std::io::Error,
    },
    #[error("not a usable TrueType/OpenType font: {0}")]
    InvalidFont(String),
}

/// Draws face annotations. Holds the label font, if one was loaded.
pub struct Overlay {
    font: Option<FontVec>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::bitmap()
    }
}

impl Overlay {
    /// Overlay using the built-in bitmap font.
    pub fn bitmap() -> Self {
        Self { font: None }
    }

    /// Overlay using a TrueType/OpenType font file.
    pub fn with_font_file(path: &Path) -> Result<Self, OverlayError> {
        let data = std::fs::read(path).map_err(|source| OverlayError::FontRead {
            path: path.display().to_string(),
            source,
        })?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| OverlayError::InvalidFont(path.display().to_string()))?;
        tracing::info!(path = %path.display(), "overlay font loaded");
        Ok(Self { font: Some(font) })
    }

    /// Try `path` first; fall back to the bitmap font with a warning.
    pub fn load_or_bitmap(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::with_font_file(p).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "overlay font unavailable; using bitmap font");
                Self::bitmap()
            }),
            None => Self::bitmap(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Decode `image_bytes` to RGB and annotate every face that has a box.
    pub fn annotate(&self, image_bytes: &[u8], faces: &[FaceDetail]) -> Result<RgbImage, OverlayError> {
        let mut image = image::load_from_memory(image_bytes)?.to_rgb8();
        self.draw_faces(&mut image, faces);
        Ok(image)
    }

    /// Same as [`annotate`](Self::annotate), encoded as PNG.
    pub fn annotate_png(&self, image_bytes: &[u8], faces: &[FaceDetail]) -> Result<Vec<u8>, OverlayError> {
        let image = self.annotate(image_bytes, faces)?;
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Draw boxes and labels onto an already-decoded image.
    pub fn draw_faces(&self, image: &mut RgbImage, faces: &[FaceDetail]) {
        let (width, height) = image.dimensions();

        for (idx, face) in faces.iter().enumerate() {
            let Some(bbox) = face.bounding_box else {
                tracing::debug!(face = idx + 1, "face has no bounding box; skipped");
                continue;
            };
            let rect = bbox.to_pixels(width, height);
            let color = Rgb(BoxColor::for_index(idx).rgb());

            // Stroke grows inward from the outer edge.
            for inset in 0..BOX_STROKE {
                let w = rect.width() + 1 - 2 * inset;
                let h = rect.height() + 1 - 2 * inset;
                if w <= 0 || h <= 0 {
                    break;
                }
                draw_hollow_rect_mut(
                    image,
                    Rect::at(rect.left + inset, rect.top + inset).of_size(w as u32, h as u32),
                    color,
                );
            }

            let label_top = rect.top - LABEL_HEIGHT;
            draw_filled_rect_mut(
                image,
                Rect::at(rect.left, label_top)
                    .of_size((LABEL_WIDTH + 1) as u32, (LABEL_HEIGHT + 1) as u32),
                LABEL_BACKGROUND,
            );

            let summary = FaceSummary::from_detail(idx, face);
            let x = rect.left + LABEL_PADDING;
            let mut y = label_top + LABEL_PADDING;
            for line in summary.label_lines() {
                match &self.font {
                    Some(font) => {
                        draw_text_mut(image, color, x, y, PxScale::from(TTF_SIZE), font, &line);
                        y += TTF_LINE_HEIGHT;
                    }
                    None => {
                        glyphs::draw_text(image, color, x, y, BITMAP_SCALE, &line);
                        y += glyphs::line_height(BITMAP_SCALE);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn face_at(left: f32, top: f32, width: f32, height: f32) -> FaceDetail {
        FaceDetail {
            bounding_box: Some(BoundingBox { left, top, width, height }),
            ..Default::default()
        }
    }

    fn white(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_box_drawn_at_denormalized_rect() {
        let mut img = white(1000, 1000);
        Overlay::bitmap().draw_faces(&mut img, &[face_at(0.1, 0.1, 0.2, 0.3)]);

        let red = Rgb([255, 0, 0]);
        // Outer edge and the inner stroke lines
        assert_eq!(img.get_pixel(100, 250), &red);
        assert_eq!(img.get_pixel(102, 250), &red);
        assert_eq!(img.get_pixel(300, 250), &red);
        assert_eq!(img.get_pixel(200, 400), &red);
        // Inside the stroke stays untouched
        assert_eq!(img.get_pixel(103, 250), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(200, 250), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_label_background_above_box() {
        let mut img = white(1000, 1000);
        Overlay::bitmap().draw_faces(&mut img, &[face_at(0.1, 0.5, 0.2, 0.2)]);
        // Label spans (100, 420)-(250, 500); the far right column has no text.
        assert_eq!(img.get_pixel(249, 421), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(251, 421), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(120, 419), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_second_face_uses_second_color() {
        let mut img = white(200, 200);
        let faces = [face_at(0.0, 0.6, 0.1, 0.1), face_at(0.5, 0.6, 0.2, 0.2)];
        Overlay::bitmap().draw_faces(&mut img, &faces);
        assert_eq!(img.get_pixel(100, 150), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_face_at_top_edge_clips_label() {
        let mut img = white(100, 100);
        Overlay::bitmap().draw_faces(&mut img, &[face_at(0.2, 0.0, 0.5, 0.5)]);
        // Label covers (20, -80)-(170, 0); only its bottom row is on canvas.
        assert_eq!(img.get_pixel(90, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(20, 30), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_face_without_box_is_skipped() {
        let mut img = white(50, 50);
        Overlay::bitmap().draw_faces(&mut img, &[FaceDetail::default()]);
        assert!(img.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_annotate_png_roundtrip_dimensions() {
        let mut png = Vec::new();
        white(64, 48)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let out = Overlay::bitmap()
            .annotate_png(&png, &[face_at(0.25, 0.5, 0.25, 0.25)])
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_annotate_rejects_garbage() {
        let err = Overlay::bitmap().annotate(b"not an image", &[]).unwrap_err();
        assert!(matches!(err, OverlayError::Image(_)));
    }

    #[test]
    fn test_missing_font_falls_back_to_bitmap() {
        let overlay = Overlay::load_or_bitmap(Some(Path::new("/nonexistent/font.ttf")));
        assert!(!overlay.has_font());
    }
}
