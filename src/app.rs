use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::annotator::AnnotatorListener;
use crate::config::Config;
use crate::export;
use crate::fixtures::FixtureBook;
use crate::geometry::BoundingBox;
use crate::locator::Locator;
use crate::session::Designer;

const THUMBNAIL_HEIGHT: f32 = 180.0;

/// Collects what the locator reported during one frame.
#[derive(Default)]
struct LocateOutcome {
    completed: Option<BoundingBox>,
    closed: bool,
}

impl AnnotatorListener for LocateOutcome {
    fn on_bounding_box_complete(&mut self, bbox: BoundingBox) {
        self.completed = Some(bbox);
    }

    fn on_modal_closed(&mut self) {
        self.closed = true;
    }
}

struct Thumbnail {
    uri: String,
    bytes: Arc<[u8]>,
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct FixtureApp {
    config: Config,
    config_path: Option<PathBuf>,
    designer: Designer,

    book: Option<FixtureBook>,
    thumbnail: Option<Thumbnail>,

    locator: Locator,
    locating: Option<usize>,

    new_name: String,
    new_space: String,
    show_settings: bool,
    status: Option<String>,
}

impl FixtureApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        designer: Designer,
        image_path: Option<PathBuf>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut app = Self {
            locator: Locator::new(&config),
            config,
            config_path: Config::default_path(),
            designer,
            book: None,
            thumbnail: None,
            locating: None,
            new_name: String::new(),
            new_space: String::new(),
            show_settings: false,
            status: None,
        };
        if let Some(path) = image_path {
            app.open_slide(&cc.egui_ctx, &path);
        }
        app
    }

    fn open_slide(&mut self, ctx: &egui::Context, path: &Path) {
        let book = match FixtureBook::load(path) {
            Ok(book) => book,
            Err(e) => {
                // keep the slide usable; the broken sidecar is overwritten on next save
                log::error!("{:#}", e);
                self.status = Some(format!("{:#}", e));
                FixtureBook::empty(path.to_path_buf())
            }
        };
        self.locator.forget_image();
        if let Some(old) = self.thumbnail.take() {
            ctx.forget_image(&old.uri);
        }
        self.thumbnail = match std::fs::read(path) {
            Ok(bytes) => Some(Thumbnail {
                uri: format!("bytes://{}", path.display()),
                bytes: bytes.into(),
            }),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        };
        self.book = Some(book);
        self.locating = None;
    }

    fn auto_save(&mut self) {
        if let Some(ref book) = self.book {
            if let Err(e) = book.save() {
                log::error!("{:#}", e);
                self.status = Some(format!("{:#}", e));
            }
        }
    }

    fn start_locating(&mut self, index: usize) {
        let Some(ref book) = self.book else {
            return;
        };
        let Some(fixture) = book.get(index) else {
            return;
        };
        let title = format!("Locate {}", fixture.name);
        let saved = fixture.bounding_box;
        let image_path = book.image_path().to_path_buf();
        self.locator.open(&image_path, title, saved);
        self.locating = Some(index);
    }

    fn finish_locating(&mut self, outcome: LocateOutcome) {
        let Some(index) = self.locating else {
            return;
        };
        if let Some(bbox) = outcome.completed {
            if let Some(ref mut book) = self.book {
                match book.set_bounding_box(index, bbox, &self.designer) {
                    Ok(()) => self.status = None,
                    Err(e) => {
                        log::error!("{:#}", e);
                        self.status = Some(format!("{:#}", e));
                    }
                }
            }
            self.auto_save();
        }
        if outcome.completed.is_some() || outcome.closed || !self.locator.is_open() {
            self.locating = None;
        }
    }

    fn pick_slide(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
            .pick_file();
        if let Some(path) = picked {
            self.open_slide(ctx, &path);
        }
    }

    fn export(&mut self) {
        let Some(ref book) = self.book else {
            return;
        };
        self.status = Some(match export::export_located(book, &self.config) {
            Ok(path) => format!("Exported to {}", path.display()),
            Err(e) => {
                log::error!("{:#}", e);
                format!("{:#}", e)
            }
        });
    }

    fn save_settings(&mut self) {
        self.locator.apply_config(&self.config);
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            log::error!("{:#}", e);
            self.status = Some(format!("{:#}", e));
        }
    }

    fn toolbar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open slide…").clicked() {
                self.pick_slide(ui.ctx());
            }
            let can_export = self
                .book
                .as_ref()
                .is_some_and(|b| b.located().next().is_some());
            if ui.add_enabled(can_export, egui::Button::new("Export")).clicked() {
                self.export();
            }
            ui.separator();
            ui.toggle_value(&mut self.show_settings, "Settings");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Designer: {}", self.designer.name()));
            });
        });

        if self.show_settings {
            ui.horizontal(|ui| {
                let mut rgb = [
                    self.config.stroke_color.r,
                    self.config.stroke_color.g,
                    self.config.stroke_color.b,
                ];
                ui.label("Color:");
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    self.config.stroke_color.r = rgb[0];
                    self.config.stroke_color.g = rgb[1];
                    self.config.stroke_color.b = rgb[2];
                }
                ui.separator();
                ui.label("Thickness:");
                ui.add(egui::Slider::new(
                    &mut self.config.stroke_thickness,
                    1.0..=10.0,
                ));
                ui.separator();
                if ui.button("Save settings").clicked() {
                    self.save_settings();
                }
            });
        }
    }

    fn fixtures_ui(&mut self, ui: &mut egui::Ui) {
        let Some(ref book) = self.book else {
            ui.centered_and_justified(|ui| {
                ui.label("Open a slide to start cataloguing fixtures.");
            });
            return;
        };

        if let Some(ref thumb) = self.thumbnail {
            ui.add(
                egui::Image::from_bytes(thumb.uri.clone(), thumb.bytes.clone())
                    .max_height(THUMBNAIL_HEIGHT),
            );
        }
        ui.label(book.image_path().display().to_string());
        ui.separator();

        let mut locate = None;
        let mut clear = None;
        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("fixtures")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    ui.strong("Fixture");
                    ui.strong("Space");
                    ui.strong("Location");
                    ui.strong("");
                    ui.end_row();

                    for (i, fixture) in book.fixtures().iter().enumerate() {
                        ui.label(fixture.name.as_str());
                        ui.label(fixture.space.as_deref().unwrap_or("—"));
                        match (fixture.bounding_box, &fixture.located_by) {
                            (Some(bbox), by) => {
                                let (min, max) = bbox.normalized();
                                let text = format!(
                                    "({:.0}, {:.0}) – ({:.0}, {:.0})",
                                    min.x, min.y, max.x, max.y
                                );
                                let label = ui.label(text);
                                if let Some(by) = by {
                                    label.on_hover_text(format!("Located by {}", by));
                                }
                            }
                            (None, _) => {
                                ui.weak("not located");
                            }
                        }
                        ui.horizontal(|ui| {
                            if ui.button("Locate").clicked() {
                                locate = Some(i);
                            }
                            if ui
                                .add_enabled(fixture.is_located(), egui::Button::new("Clear box"))
                                .clicked()
                            {
                                clear = Some(i);
                            }
                            if ui.button("Remove").clicked() {
                                remove = Some(i);
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        ui.separator();
        let mut add = false;
        ui.horizontal(|ui| {
            ui.label("Name:");
            let name = ui.text_edit_singleline(&mut self.new_name);
            ui.label("Space:");
            ui.text_edit_singleline(&mut self.new_space);
            let submitted = name.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Add fixture").clicked() || submitted {
                add = true;
            }
        });

        if let Some(i) = locate {
            self.start_locating(i);
        }
        if let Some(i) = clear {
            self.edit_book(|book| book.clear_bounding_box(i));
        }
        if let Some(i) = remove {
            self.edit_book(|book| book.remove(i).map(|_| ()));
            self.locating = None;
        }
        if add {
            if let Some(ref mut book) = self.book {
                let result = add_from_form(book, &mut self.new_name, &mut self.new_space);
                self.after_edit(result);
            }
        }
    }

    fn edit_book(&mut self, edit: impl FnOnce(&mut FixtureBook) -> anyhow::Result<()>) {
        let Some(ref mut book) = self.book else {
            return;
        };
        let result = edit(book);
        self.after_edit(result);
    }

    fn after_edit(&mut self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => {
                self.status = None;
                self.auto_save();
            }
            Err(e) => {
                log::warn!("{:#}", e);
                self.status = Some(format!("{:#}", e));
            }
        }
    }
}

/// Add a fixture from the form fields. The fields are only cleared once the
/// fixture is accepted, so a rejected entry keeps what was typed.
fn add_from_form(
    book: &mut FixtureBook,
    name: &mut String,
    space: &mut String,
) -> anyhow::Result<()> {
    book.add(name.as_str(), Some(space.as_str()))?;
    name.clear();
    space.clear();
    Ok(())
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for FixtureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (open, export) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::O),
                i.modifiers.command && i.key_pressed(egui::Key::E),
            )
        });
        if open && !self.locator.is_open() {
            self.pick_slide(ctx);
        }
        if export {
            self.export();
        }

        let locating = self.locator.is_open();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(!locating, |ui| self.toolbar_ui(ui));
        });

        if let Some(ref status) = self.status {
            let status = status.clone();
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(status);
                    if ui.small_button("×").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!locating, |ui| self.fixtures_ui(ui));
        });

        let mut outcome = LocateOutcome::default();
        self.locator.show(ctx, &mut outcome);
        self.finish_locating(outcome);
    }
}
