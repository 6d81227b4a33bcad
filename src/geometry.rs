use serde::{Deserialize, Serialize};

// ── Points & Sizes ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, size.width] x [0, size.height]`.
    pub fn clamp_to(self, size: Size) -> Self {
        Self {
            x: self.x.clamp(0.0, size.width.max(0.0)),
            y: self.y.clamp(0.0, size.height.max(0.0)),
        }
    }

    pub fn to_egui(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    pub fn from_egui(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Largest size with this aspect ratio that fits inside `target`.
    ///
    /// Whichever of the two target dimensions constrains first is used at
    /// full length; the other is derived from the aspect ratio.
    pub fn fit_within(&self, target: Size) -> Size {
        if self.is_degenerate() || target.is_degenerate() {
            return Size::ZERO;
        }
        if self.width * target.height > target.width * self.height {
            Size::new(target.width, target.width * self.height / self.width)
        } else {
            Size::new(target.height * self.width / self.height, target.height)
        }
    }

    pub fn to_egui(self) -> egui::Vec2 {
        egui::vec2(self.width, self.height)
    }
}

// ── Bounding Box ────────────────────────────────────────────────────────────

/// A rectangle drawn over an image, in the pixel space of the canvas it was
/// drawn on. `image_size` is that canvas size, not the natural image size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub start_point: Point,
    pub end_point: Point,
    pub image_size: Size,
}

impl BoundingBox {
    pub fn new(start_point: Point, end_point: Point, image_size: Size) -> Self {
        Self {
            start_point,
            end_point,
            image_size,
        }
    }

    /// Top-left and bottom-right corners. The stored points carry no ordering.
    pub fn normalized(&self) -> (Point, Point) {
        let (s, e) = (self.start_point, self.end_point);
        (
            Point::new(s.x.min(e.x), s.y.min(e.y)),
            Point::new(s.x.max(e.x), s.y.max(e.y)),
        )
    }

    pub fn width(&self) -> f32 {
        (self.end_point.x - self.start_point.x).abs()
    }

    pub fn height(&self) -> f32 {
        (self.end_point.y - self.start_point.y).abs()
    }

    /// Re-express the box against another canvas (or the natural image size).
    /// Points always end up inside `target`; a degenerate source size is not
    /// scaled, only clamped.
    pub fn rescaled(&self, target: Size) -> BoundingBox {
        let (sx, sy) = if self.image_size == target || self.image_size.is_degenerate() {
            (1.0, 1.0)
        } else {
            (
                target.width / self.image_size.width,
                target.height / self.image_size.height,
            )
        };
        let scale = |p: Point| Point::new(p.x * sx, p.y * sy).clamp_to(target);
        BoundingBox {
            start_point: scale(self.start_point),
            end_point: scale(self.end_point),
            image_size: target,
        }
    }

    pub fn to_egui_rect(&self, origin: egui::Pos2) -> egui::Rect {
        let (min, max) = self.normalized();
        egui::Rect::from_min_max(
            origin + min.to_egui().to_vec2(),
            origin + max.to_egui().to_vec2(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODAL: Size = Size {
        width: 640.0,
        height: 480.0,
    };

    #[test]
    fn test_landscape_clamps_to_width() {
        let fitted = Size::new(1920.0, 1080.0).fit_within(MODAL);
        assert_eq!(fitted, Size::new(640.0, 360.0));
    }

    #[test]
    fn test_portrait_clamps_to_height() {
        let fitted = Size::new(480.0, 960.0).fit_within(MODAL);
        assert_eq!(fitted, Size::new(240.0, 480.0));
    }

    #[test]
    fn test_near_square_landscape_still_fits() {
        // wider than tall, but not as wide as the modal
        let fitted = Size::new(1100.0, 1000.0).fit_within(MODAL);
        assert_eq!(fitted.height, 480.0);
        assert!(fitted.width <= 640.0);
        assert!((fitted.width - 528.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_image_fits_to_zero() {
        assert_eq!(Size::new(0.0, 100.0).fit_within(MODAL), Size::ZERO);
        assert_eq!(Size::new(100.0, 100.0).fit_within(Size::ZERO), Size::ZERO);
    }

    #[test]
    fn test_normalized_orders_corners() {
        let bbox = BoundingBox::new(
            Point::new(100.0, 80.0),
            Point::new(10.0, 10.0),
            Size::new(640.0, 360.0),
        );
        let (min, max) = bbox.normalized();
        assert_eq!(min, Point::new(10.0, 10.0));
        assert_eq!(max, Point::new(100.0, 80.0));
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 70.0);
    }

    #[test]
    fn test_rescale_to_same_size_is_identity() {
        let bbox = BoundingBox::new(
            Point::new(10.0, 10.0),
            Point::new(100.0, 80.0),
            Size::new(640.0, 360.0),
        );
        assert_eq!(bbox.rescaled(Size::new(640.0, 360.0)), bbox);
    }

    #[test]
    fn test_rescale_to_natural_resolution() {
        let bbox = BoundingBox::new(
            Point::new(10.0, 10.0),
            Point::new(100.0, 80.0),
            Size::new(640.0, 360.0),
        );
        let natural = bbox.rescaled(Size::new(1920.0, 1080.0));
        assert_eq!(natural.start_point, Point::new(30.0, 30.0));
        assert_eq!(natural.end_point, Point::new(300.0, 240.0));
        assert_eq!(natural.image_size, Size::new(1920.0, 1080.0));
    }

    #[test]
    fn test_rescale_clamps_out_of_range_points() {
        let bbox = BoundingBox::new(
            Point::new(-50.0, 10.0),
            Point::new(9000.0, 80.0),
            Size::new(640.0, 360.0),
        );
        let same = bbox.rescaled(Size::new(640.0, 360.0));
        assert_eq!(same.start_point, Point::new(0.0, 10.0));
        assert_eq!(same.end_point, Point::new(640.0, 80.0));

        let degenerate = BoundingBox::new(
            Point::new(5000.0, 5000.0),
            Point::new(10.0, 10.0),
            Size::ZERO,
        );
        let clamped = degenerate.rescaled(Size::new(640.0, 360.0));
        assert_eq!(clamped.start_point, Point::new(640.0, 360.0));
        assert_eq!(clamped.end_point, Point::new(10.0, 10.0));
        assert_eq!(clamped.image_size, Size::new(640.0, 360.0));
    }

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let bbox = BoundingBox::new(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Size::new(5.0, 6.0),
        );
        let json = serde_json::to_value(bbox).unwrap();
        assert_eq!(json["startPoint"]["x"], 1.0);
        assert_eq!(json["endPoint"]["y"], 4.0);
        assert_eq!(json["imageSize"]["width"], 5.0);
    }
}
