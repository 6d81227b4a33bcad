use eframe::egui;
use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::annotator::{Annotator, AnnotatorListener};
use crate::config::Config;
use crate::geometry::{BoundingBox, Point, Size};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Clear,
    Save,
    Cancel,
}

/// Dialog that shows a slide at a fitted size and lets the designer drag out
/// one bounding box over it.
pub struct Locator {
    annotator: Annotator,
    title: String,
    image_path: Option<PathBuf>,
    raw_image: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    stroke: egui::Stroke,
}

impl Locator {
    pub fn new(config: &Config) -> Self {
        Self {
            annotator: Annotator::new(config.modal_size),
            title: String::new(),
            image_path: None,
            raw_image: None,
            texture: None,
            stroke: egui::Stroke::new(config.stroke_thickness, config.stroke_color.to_egui()),
        }
    }

    pub fn apply_config(&mut self, config: &Config) {
        self.stroke = egui::Stroke::new(config.stroke_thickness, config.stroke_color.to_egui());
        if !self.annotator.is_open() && self.annotator.target() != config.modal_size {
            self.annotator = Annotator::new(config.modal_size);
        }
    }

    pub fn is_open(&self) -> bool {
        self.annotator.is_open()
    }

    pub fn open(&mut self, image_path: &Path, title: String, saved: Option<BoundingBox>) {
        if self.image_path.as_deref() != Some(image_path) {
            self.texture = None;
            self.raw_image = match image::open(image_path) {
                Ok(img) => Some(img),
                Err(e) => {
                    log::warn!("Failed to load {}: {}", image_path.display(), e);
                    None
                }
            };
            self.image_path = Some(image_path.to_path_buf());
        }
        let natural = self
            .raw_image
            .as_ref()
            .map(|img| Size::new(img.width() as f32, img.height() as f32));
        self.title = title;
        self.annotator.open(natural, saved);
    }

    /// Drop the decoded slide so the next `open` reads it from disk again.
    pub fn forget_image(&mut self) {
        self.image_path = None;
        self.raw_image = None;
        self.texture = None;
    }

    fn slide_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        if self.texture.is_none() {
            let img = self.raw_image.as_ref()?.to_rgba8();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [img.width() as usize, img.height() as usize],
                img.as_raw(),
            );
            self.texture =
                Some(ctx.load_texture("fixture-slide", color_image, egui::TextureOptions::LINEAR));
        }
        self.texture.as_ref().map(egui::TextureHandle::id)
    }

    pub fn show(&mut self, ctx: &egui::Context, listener: &mut impl AnnotatorListener) {
        if !self.annotator.is_open() {
            return;
        }
        let texture = self.slide_texture(ctx);

        let mut window_open = true;
        let mut action = None;
        egui::Window::new(self.title.clone())
            .id(egui::Id::new("locator"))
            .open(&mut window_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                match self.annotator.canvas_size() {
                    Some(canvas) => self.canvas_ui(ui, canvas, texture),
                    None => {
                        ui.set_min_size(self.annotator.target().to_egui() * 0.5);
                        ui.label("The slide image could not be loaded.");
                    }
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        action = Some(Action::Clear);
                    }
                    let save = egui::Button::new("Save");
                    if ui.add_enabled(self.annotator.can_save(), save).clicked() {
                        action = Some(Action::Save);
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(Action::Cancel);
                    }
                    if let Some(bbox) = self.annotator.current_box() {
                        ui.separator();
                        ui.label(format!("{:.0} × {:.0}", bbox.width(), bbox.height()));
                    }
                });
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            action = Some(Action::Cancel);
        }
        if !window_open {
            action = Some(Action::Cancel);
        }

        match action {
            Some(Action::Clear) => self.annotator.clear(),
            Some(Action::Save) => {
                self.annotator.save(listener);
            }
            Some(Action::Cancel) => self.annotator.cancel(listener),
            None => {}
        }
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui, canvas: Size, texture: Option<egui::TextureId>) {
        let (response, painter) =
            ui.allocate_painter(canvas.to_egui(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let to_canvas = |p: egui::Pos2| Point::from_egui((p - rect.min).to_pos2());

        if response.drag_started_by(egui::PointerButton::Primary) {
            // the drag is only recognised after some movement; start where the press began
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = origin {
                self.annotator.pointer_down(to_canvas(pos));
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.annotator.pointer_move(to_canvas(pos));
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.annotator.pointer_up();
        }
        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.annotator.pointer_down(to_canvas(pos));
                self.annotator.pointer_up();
            }
        }

        // Full redraw every frame: background, image, then the rectangle.
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));
        if let Some(texture) = texture {
            painter.image(
                texture,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        if let Some(bbox) = self.annotator.current_box() {
            painter.rect_stroke(
                bbox.to_egui_rect(rect.min),
                0.0,
                self.stroke,
                egui::StrokeKind::Middle,
            );
        }
    }
}
