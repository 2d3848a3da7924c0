use mrz_fast_types::{DocumentFrameSpec, Rect};

use crate::error::GeometryError;

/// Document frame in fractional pixel coordinates, before clamping.
/// Layout math stays in f64 end to end; truncation to whole pixels happens
/// once, at [`Rect`] construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Centered document frame for a source image, per the overlay convention:
/// portrait sources fill `width_fill` of the width, landscape/square sources
/// fill `height_fill` of the height, and the other dimension follows the
/// document aspect ratio.
pub fn document_layout(
    image_width: u32,
    image_height: u32,
    spec: &DocumentFrameSpec,
) -> FrameLayout {
    let image_w = f64::from(image_width);
    let image_h = f64::from(image_height);

    let (width, height) = if image_height > image_width {
        let width = image_w * spec.width_fill();
        (width, width / spec.aspect_ratio())
    } else {
        let height = image_h * spec.height_fill();
        (height * spec.aspect_ratio(), height)
    };

    FrameLayout {
        left: (image_w - width) / 2.0,
        top: (image_h - height) / 2.0,
        width,
        height,
    }
}

/// Full-document crop rect: the centered frame expanded symmetrically by the
/// configured margin on each side, clamped to the image. When the margin overruns
/// an edge the dimension shrinks to the available room instead of erroring;
/// only a crop with no remaining area is rejected.
pub fn document_rect(
    image_width: u32,
    image_height: u32,
    spec: &DocumentFrameSpec,
) -> Result<Rect, GeometryError> {
    let layout = document_layout(image_width, image_height, spec);
    let margin_x = layout.width * spec.margin();
    let margin_y = layout.height * spec.margin();

    let expanded = FrameLayout {
        left: layout.left - margin_x,
        top: layout.top - margin_y,
        width: layout.width + 2.0 * margin_x,
        height: layout.height + 2.0 * margin_y,
    };
    clamp_to_image(image_width, image_height, expanded)
}

/// MRZ band crop rect: the bottom `mrz_band` fraction of the document frame
/// height at full document width, clamped like [`document_rect`].
pub fn mrz_band_rect(
    image_width: u32,
    image_height: u32,
    spec: &DocumentFrameSpec,
) -> Result<Rect, GeometryError> {
    let layout = document_layout(image_width, image_height, spec);
    let band_height = layout.height * spec.mrz_band();

    let band = FrameLayout {
        left: layout.left,
        top: layout.top + layout.height - band_height,
        width: layout.width,
        height: band_height,
    };
    clamp_to_image(image_width, image_height, band)
}

fn clamp_to_image(
    image_width: u32,
    image_height: u32,
    layout: FrameLayout,
) -> Result<Rect, GeometryError> {
    let image_w = f64::from(image_width);
    let image_h = f64::from(image_height);

    let left = layout.left.max(0.0);
    let top = layout.top.max(0.0);
    let width = layout.width.min(image_w - left);
    let height = layout.height.min(image_h - top);

    let invalid = || GeometryError::InvalidGeometry {
        image_width,
        image_height,
        frame_width: width,
        frame_height: height,
    };

    if width <= 0.0 || height <= 0.0 {
        return Err(invalid());
    }

    let rect_width = width.floor() as u32;
    let rect_height = height.floor() as u32;
    if rect_width == 0 || rect_height == 0 {
        return Err(invalid());
    }

    Rect::new(left.floor() as u32, top.floor() as u32, rect_width, rect_height)
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrz_fast_types::DocumentFrameSpec;

    fn passport() -> DocumentFrameSpec {
        DocumentFrameSpec::passport()
    }

    #[test]
    fn portrait_layout_fills_width() {
        let layout = document_layout(1080, 1920, &passport());
        assert_eq!(layout.width, 972.0);
        assert!((layout.height - 684.507).abs() < 0.01);
        assert_eq!(layout.left, 54.0);
        assert!((layout.top - 617.746).abs() < 0.01);
    }

    #[test]
    fn landscape_layout_fills_height() {
        let layout = document_layout(1920, 1080, &passport());
        assert_eq!(layout.height, 810.0);
        assert!((layout.width - 810.0 * 1.42).abs() < 1e-9);
        assert!((layout.top - 135.0).abs() < 1e-9);
    }

    #[test]
    fn document_rect_is_deterministic_and_contained() {
        let first = document_rect(1080, 1920, &passport()).unwrap();
        let second = document_rect(1080, 1920, &passport()).unwrap();
        assert_eq!(first, second);
        assert!(first.contained_in(1080, 1920));
    }

    #[test]
    fn rects_stay_inside_across_dimensions() {
        let spec = passport();
        for (w, h) in [
            (320, 240),
            (240, 320),
            (1080, 1920),
            (1920, 1080),
            (640, 640),
            (3024, 4032),
            (97, 131),
        ] {
            let doc = document_rect(w, h, &spec).unwrap();
            assert!(doc.contained_in(w, h), "document rect escaped {w}x{h}");
            let band = mrz_band_rect(w, h, &spec).unwrap();
            assert!(band.contained_in(w, h), "band rect escaped {w}x{h}");
        }
    }

    #[test]
    fn margin_expansion_clamps_at_edges() {
        // Portrait frame of a wide-fill spec: the expanded frame pokes past
        // the top and bottom and must shrink to the image, not error.
        let spec = DocumentFrameSpec::new(1.42, 1.0, 1.0, 0.4, 0.25).unwrap();
        let rect = document_rect(500, 360, &spec).unwrap();
        assert!(rect.contained_in(500, 360));
    }

    #[test]
    fn band_sits_at_the_bottom_of_the_frame() {
        let spec = passport();
        let layout = document_layout(1080, 1920, &spec);
        let band = mrz_band_rect(1080, 1920, &spec).unwrap();
        let expected_top = (layout.top + layout.height - layout.height * spec.mrz_band()).floor();
        assert_eq!(band.top(), expected_top as u32);
        assert_eq!(band.left(), layout.left.floor() as u32);
        assert_eq!(band.width(), layout.width.floor() as u32);
    }

    #[test]
    fn tiny_sources_are_rejected() {
        let err = mrz_band_rect(1, 2, &passport()).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeometry { .. }));
    }
}
