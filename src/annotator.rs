//! Interaction state for drawing one bounding box over a fitted image.
//!
//! Rendering lives in [`crate::locator`]; this module only tracks pointer
//! input and reports results through an [`AnnotatorListener`].

use crate::geometry::{BoundingBox, Point, Size};

pub trait AnnotatorListener {
    /// Called once per successful save, in canvas pixel space.
    fn on_bounding_box_complete(&mut self, bbox: BoundingBox);
    /// Called on cancel or explicit close. Never follows a save.
    fn on_modal_closed(&mut self);
}

#[derive(Clone, Debug)]
pub struct Annotator {
    target: Size,
    canvas_size: Option<Size>,
    start: Option<Point>,
    end: Option<Point>,
    drawing: bool,
    open: bool,
}

impl Annotator {
    pub fn new(target: Size) -> Self {
        Self {
            target,
            canvas_size: None,
            start: None,
            end: None,
            drawing: false,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn target(&self) -> Size {
        self.target
    }

    /// `None` until an image with usable dimensions has been loaded.
    pub fn canvas_size(&self) -> Option<Size> {
        self.canvas_size
    }

    /// Open over an image of `natural_size` (`None` if it failed to load),
    /// pre-rendering `saved` against the freshly fitted canvas.
    pub fn open(&mut self, natural_size: Option<Size>, saved: Option<BoundingBox>) {
        self.reset();
        self.open = true;
        self.canvas_size = natural_size
            .map(|natural| natural.fit_within(self.target))
            .filter(|size| !size.is_degenerate());

        // a saved box without a usable canvas size cannot be placed
        let saved = saved.filter(|bbox| !bbox.image_size.is_degenerate());
        if let (Some(canvas), Some(saved)) = (self.canvas_size, saved) {
            let fitted = saved.rescaled(canvas);
            self.start = Some(fitted.start_point);
            self.end = Some(fitted.end_point);
        }
        log::debug!(
            "annotator opened: canvas {:?}, pre-rendered box {}",
            self.canvas_size,
            self.start.is_some()
        );
    }

    pub fn pointer_down(&mut self, pos: Point) {
        let Some(canvas) = self.canvas_size else {
            return;
        };
        let pos = pos.clamp_to(canvas);
        self.start = Some(pos);
        self.end = Some(pos);
        self.drawing = true;
    }

    pub fn pointer_move(&mut self, pos: Point) {
        if !self.drawing {
            return;
        }
        if let Some(canvas) = self.canvas_size {
            self.end = Some(pos.clamp_to(canvas));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drawing = false;
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
        self.drawing = false;
    }

    pub fn can_save(&self) -> bool {
        self.start.is_some() && self.canvas_size.is_some()
    }

    /// The rectangle to draw right now, whether in progress or pre-rendered.
    pub fn current_box(&self) -> Option<BoundingBox> {
        let canvas = self.canvas_size?;
        let start = self.start?;
        let end = self.end.unwrap_or(start);
        Some(BoundingBox::new(start, end, canvas))
    }

    /// Emit the current box and close. Returns `false` when nothing was drawn.
    pub fn save(&mut self, listener: &mut impl AnnotatorListener) -> bool {
        let Some(bbox) = self.current_box() else {
            return false;
        };
        self.reset();
        log::info!(
            "bounding box saved: {:?} -> {:?} on {}x{} canvas",
            bbox.start_point,
            bbox.end_point,
            bbox.image_size.width,
            bbox.image_size.height
        );
        listener.on_bounding_box_complete(bbox);
        true
    }

    pub fn cancel(&mut self, listener: &mut impl AnnotatorListener) {
        self.reset();
        listener.on_modal_closed();
    }

    fn reset(&mut self) {
        self.clear();
        self.canvas_size = None;
        self.open = false;
    }
}
