use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::fixtures::FixtureBook;
use crate::geometry::{BoundingBox, Point, Size};

pub fn export_path(image_path: &Path, suffix: &str) -> PathBuf {
    image_path.with_file_name(format!(
        "{}{}.png",
        image_path
            .file_stem()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("out"),
        suffix
    ))
}

/// Stroke each located fixture onto a copy of `img`, mapping boxes from the
/// canvas they were drawn on to the image's natural resolution.
pub fn burn_boxes<'a>(
    img: &mut RgbaImage,
    boxes: impl IntoIterator<Item = &'a BoundingBox>,
    color: [u8; 4],
    thickness: f32,
) {
    let natural = Size::new(img.width() as f32, img.height() as f32);
    for bbox in boxes {
        let (min, max) = bbox.rescaled(natural).normalized();
        stroke_rect(img, min, max, thickness, color);
    }
}

pub fn export_located(book: &FixtureBook, config: &Config) -> Result<PathBuf> {
    let src = book.image_path();
    let mut img = image::open(src)
        .with_context(|| format!("Failed to open {}", src.display()))?
        .to_rgba8();

    let boxes: Vec<BoundingBox> = book.located().map(|(_, bbox)| bbox).collect();
    burn_boxes(
        &mut img,
        &boxes,
        config.stroke_color.to_rgba_u8(),
        config.stroke_thickness,
    );

    let out_path = export_path(src, &config.export_suffix);
    img.save(&out_path)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    log::info!(
        "Exported {} located fixtures to {}",
        boxes.len(),
        out_path.display()
    );
    Ok(out_path)
}

/// Paint the four edges of an axis-aligned rectangle as bands `thickness`
/// wide, centred on the edge and clipped to the image.
fn stroke_rect(img: &mut RgbaImage, min: Point, max: Point, thickness: f32, color: [u8; 4]) {
    let half = (thickness / 2.0).max(0.5) as i64;
    let (x0, y0) = (min.x.round() as i64, min.y.round() as i64);
    let (x1, y1) = (max.x.round() as i64, max.y.round() as i64);

    fill_span(img, (x0 - half, y0 - half), (x1 + half, y0 + half), color);
    fill_span(img, (x0 - half, y1 - half), (x1 + half, y1 + half), color);
    fill_span(img, (x0 - half, y0 - half), (x0 + half, y1 + half), color);
    fill_span(img, (x1 - half, y0 - half), (x1 + half, y1 + half), color);
}

/// Fill the inclusive pixel span `from..=to`, skipping anything off-image.
fn fill_span(img: &mut RgbaImage, from: (i64, i64), to: (i64, i64), color: [u8; 4]) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for y in from.1.max(0)..=to.1.min(h - 1) {
        for x in from.0.max(0)..=to.0.min(w - 1) {
            img.put_pixel(x as u32, y as u32, image::Rgba(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Designer;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_export_path_uses_suffix() {
        assert_eq!(
            export_path(Path::new("/slides/kitchen.jpg"), "_fixtures"),
            PathBuf::from("/slides/kitchen_fixtures.png")
        );
    }

    #[test]
    fn test_burn_rescales_to_natural_size() {
        // drawn on a 64x36 canvas, image is 3x larger
        let mut img = RgbaImage::new(192, 108);
        let bbox = BoundingBox::new(
            Point::new(30.0, 20.0),
            Point::new(10.0, 10.0),
            Size::new(64.0, 36.0),
        );
        burn_boxes(&mut img, [&bbox], RED, 1.0);

        // corners at (30,30) and (90,60) in natural space
        assert_eq!(img.get_pixel(30, 30).0, RED);
        assert_eq!(img.get_pixel(90, 60).0, RED);
        assert_eq!(img.get_pixel(60, 30).0, RED);
        // interior untouched
        assert_eq!(img.get_pixel(60, 45).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_thick_stroke_is_clipped_at_image_edge() {
        let mut img = RgbaImage::new(20, 20);
        let bbox = BoundingBox::new(
            Point::new(0.0, 0.0),
            Point::new(19.0, 19.0),
            Size::new(20.0, 20.0),
        );
        burn_boxes(&mut img, [&bbox], RED, 4.0);
        assert_eq!(img.get_pixel(0, 0).0, RED);
        assert_eq!(img.get_pixel(19, 10).0, RED);
        assert_eq!(img.get_pixel(2, 10).0, RED);
        assert_eq!(img.get_pixel(10, 10).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_export_writes_png_next_to_slide() {
        let dir = tempfile::tempdir().unwrap();
        let slide = dir.path().join("slide.png");
        RgbaImage::new(64, 36).save(&slide).unwrap();

        let mut book = FixtureBook::empty(slide.clone());
        let idx = book.add("Lamp", None).unwrap();
        book.set_bounding_box(
            idx,
            BoundingBox::new(
                Point::new(5.0, 5.0),
                Point::new(20.0, 20.0),
                Size::new(64.0, 36.0),
            ),
            &Designer::new("Ada"),
        )
        .unwrap();

        let out = export_located(&book, &Config::default()).unwrap();
        assert_eq!(out, dir.path().join("slide_fixtures.png"));
        let written = image::open(&out).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(5, 5).0, RED);
    }

    #[test]
    fn test_export_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let book = FixtureBook::empty(dir.path().join("gone.png"));
        assert!(export_located(&book, &Config::default()).is_err());
    }
}
