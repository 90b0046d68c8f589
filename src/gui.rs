use crate::bridge::{Action, HostBridge, HostMessage};
use crate::catalog::Category;
use crate::config::PanelConfig;
use crate::editor;
use crate::form::{FieldInput, FieldKind, FieldSpec, FormField};
use crate::format::TextFormat;
use crate::panel::PanelState;
use crate::statics;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::{
    path::PathBuf,
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};

/// How often to wake up and drain host messages while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_gui(
    config: PanelConfig,
    bridge: Box<dyn HostBridge>,
    inbound: Receiver<HostMessage>,
    start_visible: bool,
) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(config.window_size),
        ..Default::default()
    };
    let title = format!("{} {}", statics::EN_APP_TITLE, env!("CARGO_PKG_VERSION"));
    let mut state = PanelState::new(&config);
    state.visible = start_visible;
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PanelApp {
                state,
                bridge,
                inbound,
                export_dir: None,
            }))
        }),
    )
}

/// egui binding around [`PanelState`]. Owns the bridge and the inbound
/// channel; everything else is delegated to the controller.
struct PanelApp {
    state: PanelState,
    bridge: Box<dyn HostBridge>,
    inbound: Receiver<HostMessage>,
    export_dir: Option<PathBuf>,
}

impl PanelApp {
    fn drain_inbound(&mut self, now: Instant) {
        while let Ok(msg) = self.inbound.try_recv() {
            let result = self.state.handle_message(msg, self.bridge.as_mut(), now);
            self.state.report(result, now);
        }
    }

    fn run_action(&mut self, action: Action) {
        let result = self.state.dispatch(action, self.bridge.as_mut());
        self.state.report(result, Instant::now());
    }

    fn refresh(&mut self) {
        let result = self.state.request_refresh(self.bridge.as_mut());
        self.state.report(result, Instant::now());
    }

    fn close(&mut self) {
        let result = self.state.close(self.bridge.as_mut());
        self.state.report(result, Instant::now());
    }

    fn export_editor(&mut self) {
        let format = self.state.format;
        let (filter_name, ext) = match format {
            TextFormat::Json => (statics::EN_EXPORT_FILTER_JSON, "json"),
            TextFormat::Lua => (statics::EN_EXPORT_FILTER_LUA, "lua"),
        };
        let file_name = format!("{}{}", self.state.key_text.trim(), format.extension());

        let mut dlg = rfd::FileDialog::new()
            .add_filter(filter_name, &[ext])
            .set_file_name(file_name);
        if let Some(dir) = self.export_dir.clone() {
            dlg = dlg.set_directory(dir);
        }
        let Some(path) = dlg.save_file() else {
            return;
        };

        let now = Instant::now();
        match self.state.export_editor_text(&path) {
            Ok(()) => {
                self.export_dir = path.parent().map(PathBuf::from);
                self.state.show_toast(
                    format!("{} {}", statics::EN_PREFIX_EXPORTED, path.display()),
                    true,
                    now,
                );
            }
            Err(e) => {
                tracing::warn!("export failed: {e:#}");
                self.state
                    .show_toast(format!("{} {e:#}", statics::EN_ERR_EXPORT), false, now);
            }
        }
    }

    fn selectable_row_left(
        ui: &mut egui::Ui,
        selected: bool,
        text: &str,
        row_h: f32,
    ) -> egui::Response {
        let w = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(egui::vec2(w, row_h), egui::Sense::click());
        let response = response.on_hover_cursor(egui::CursorIcon::PointingHand);

        let visuals = ui.style().interact_selectable(&response, selected);
        if ui.is_rect_visible(rect) {
            ui.painter()
                .rect_filled(rect, visuals.corner_radius, visuals.bg_fill);

            let font_id = egui::TextStyle::Monospace.resolve(ui.style());
            let text_pos = rect.left_center() + egui::vec2(6.0, 0.0);
            ui.painter().text(
                text_pos,
                egui::Align2::LEFT_CENTER,
                text,
                font_id,
                visuals.text_color(),
            );
        }

        response
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for category in Category::ALL {
                    if ui
                        .selectable_label(self.state.tab == category, category.as_str())
                        .clicked()
                    {
                        self.state.switch_tab(category);
                    }
                }

                ui.separator();

                let mut format = self.state.format;
                ui.label(statics::EN_LABEL_FORMAT);
                egui::ComboBox::from_id_salt("text_format")
                    .selected_text(format.label())
                    .show_ui(ui, |ui| {
                        for f in TextFormat::ALL {
                            ui.selectable_value(&mut format, f, f.label());
                        }
                    });
                if format != self.state.format {
                    self.state.set_format(format);
                }

                ui.separator();

                if ui.button(statics::EN_BTN_ADD).clicked() {
                    self.state.open_add_form();
                }
                if ui.button(statics::EN_BTN_UPDATE).clicked() {
                    self.run_action(Action::Update);
                }
                if ui.button(statics::EN_BTN_REMOVE).clicked() {
                    self.run_action(Action::Remove);
                }
                if ui.button(statics::EN_BTN_REFRESH).clicked() {
                    self.refresh();
                }
                if ui.button(statics::EN_BTN_EXPORT).clicked() {
                    self.export_editor();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(statics::EN_BTN_CLOSE).clicked() {
                        self.close();
                    }
                });
            });
        });
    }

    fn render_entry_list(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("entry_list")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(statics::EN_LABEL_SEARCH);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.state.filter)
                            .hint_text(statics::EN_HINT_SEARCH),
                    );
                });
                ui.separator();

                let keys = self.state.visible_keys();
                if keys.is_empty() {
                    ui.weak(statics::EN_LIST_EMPTY);
                    return;
                }

                let row_h = ui.text_style_height(&egui::TextStyle::Body) + 6.0;
                let mut clicked: Option<String> = None;
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show_rows(ui, row_h, keys.len(), |ui, range| {
                        for key in &keys[range] {
                            let selected = self.state.selected_key.as_deref() == Some(key);
                            if Self::selectable_row_left(ui, selected, key, row_h).clicked() {
                                clicked = Some(key.clone());
                            }
                        }
                    });
                if let Some(key) = clicked {
                    self.state.select(&key);
                }
            });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status = self.state.status();
            ui.horizontal(|ui| {
                ui.monospace(status.left);
                ui.separator();
                ui.label(status.center);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.monospace(status.right);
                });
            });
        });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.monospace(self.state.file_label());
            ui.horizontal(|ui| {
                ui.label(statics::EN_LABEL_KEY);
                ui.add(egui::TextEdit::singleline(&mut self.state.key_text).desired_width(260.0));
            });
            ui.separator();

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_top(|ui| {
                        let gutter = editor::gutter_text(&self.state.editor_text);
                        ui.add(
                            egui::Label::new(egui::RichText::new(gutter).monospace().weak())
                                .selectable(false),
                        );
                        let output = egui::TextEdit::multiline(&mut self.state.editor_text)
                            .code_editor()
                            .desired_rows(24)
                            .desired_width(f32::INFINITY)
                            .show(ui);
                        if let Some(range) = output.cursor_range {
                            self.state.cursor = range.primary.index;
                        }
                    });
                });
        });
    }

    fn field_label(spec: &FieldSpec) -> String {
        if spec.required {
            format!("{} *", spec.label)
        } else {
            spec.label.to_string()
        }
    }

    fn number_hint(spec: &FieldSpec) -> Option<String> {
        match (spec.min, spec.step) {
            (Some(min), Some(step)) => Some(format!("min {min}, step {step}")),
            (Some(min), None) => Some(format!("min {min}")),
            (None, Some(step)) => Some(format!("step {step}")),
            (None, None) => None,
        }
    }

    fn render_field_input(ui: &mut egui::Ui, field: &mut FormField) {
        let spec = field.spec;
        match &mut field.input {
            FieldInput::Checked(checked) => {
                ui.checkbox(checked, "");
            }
            FieldInput::Text(text) => match spec.kind {
                FieldKind::Multiline => {
                    ui.add(
                        egui::TextEdit::multiline(text)
                            .code_editor()
                            .desired_rows(6)
                            .hint_text(spec.placeholder)
                            .desired_width(f32::INFINITY),
                    );
                }
                FieldKind::Number => {
                    ui.add(
                        egui::TextEdit::singleline(text)
                            .hint_text(spec.placeholder)
                            .desired_width(120.0),
                    );
                    if let Some(hint) = Self::number_hint(spec) {
                        ui.weak(hint);
                    }
                }
                FieldKind::Text | FieldKind::Checkbox => {
                    ui.add(
                        egui::TextEdit::singleline(text)
                            .hint_text(spec.placeholder)
                            .desired_width(f32::INFINITY),
                    );
                }
            },
        }
    }

    fn render_add_form(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.state.cancel_add_form();
        }
        let Some(form) = self.state.add_form.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;
        let title = format!(
            "{} {} {}",
            statics::EN_WINDOW_ADD_PREFIX,
            form.category,
            statics::EN_WINDOW_ADD_SUFFIX
        );

        egui::Window::new(title)
            .collapsible(false)
            .resizable(true)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(statics::EN_LABEL_TABLE_KEY);
                ui.add(
                    egui::TextEdit::singleline(&mut form.key)
                        .hint_text(statics::EN_HINT_TABLE_KEY)
                        .desired_width(f32::INFINITY),
                );
                ui.separator();

                let row_h = ui.text_style_height(&egui::TextStyle::Body) + 8.0;
                ui.push_id("add_form_table", |ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                        .column(Column::initial(150.0).resizable(false))
                        .column(Column::remainder())
                        .body(|mut body| {
                            for field in form.fields.iter_mut() {
                                let h = if field.spec.kind == FieldKind::Multiline {
                                    row_h * 7.0
                                } else {
                                    row_h
                                };
                                body.row(h, |mut row| {
                                    row.col(|ui| {
                                        ui.label(Self::field_label(field.spec));
                                    });
                                    row.col(|ui| {
                                        Self::render_field_input(ui, field);
                                    });
                                });
                            }
                        });
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CANCEL).clicked() {
                        cancel = true;
                    }
                    if ui.button(statics::EN_BTN_ADD).clicked() {
                        submit = true;
                    }
                });
            });

        if cancel {
            self.state.cancel_add_form();
        } else if submit {
            let result = self.state.submit_add_form(self.bridge.as_mut());
            self.state.report(result, Instant::now());
        }
    }

    fn render_toast(&self, ctx: &egui::Context) {
        let Some(toast) = self.state.toast.as_ref() else {
            return;
        };
        let color = if toast.ok {
            egui::Color32::from_rgb(0, 160, 0)
        } else {
            egui::Color32::from_rgb(220, 0, 0)
        };
        egui::Area::new(egui::Id::new("toast"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -40.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.colored_label(color, &toast.message);
                });
            });
    }

    fn render_hidden(&mut self, ctx: &egui::Context) {
        let mut reopen = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading(statics::EN_HIDDEN_HEADING);
                ui.label(statics::EN_HIDDEN_INSTRUCTIONS);
                if ui.button(statics::EN_BTN_REOPEN).clicked() {
                    reopen = true;
                }
            });
        });
        if reopen {
            self.state.visible = true;
            self.refresh();
        }
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.drain_inbound(now);

        // Keep waking up: host messages arrive off the UI thread.
        let wake = self
            .state
            .expire_toast(now)
            .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));
        ctx.request_repaint_after(wake);

        if !self.state.visible {
            self.render_hidden(ctx);
            return;
        }

        self.render_top_bar(ctx);
        self.render_status_bar(ctx);
        self.render_entry_list(ctx);
        self.render_editor(ctx);
        self.render_add_form(ctx);
        self.render_toast(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::PanelApp;
    use crate::catalog::Category;
    use crate::form::field_specs;

    #[test]
    fn required_fields_are_starred() {
        let specs = field_specs(Category::Items);
        let name = specs.iter().find(|s| s.key == "name").unwrap();
        let image = specs.iter().find(|s| s.key == "image").unwrap();
        assert_eq!(PanelApp::field_label(name), "name *");
        assert_eq!(PanelApp::field_label(image), "image");
    }

    #[test]
    fn number_hint_reports_range() {
        let specs = field_specs(Category::Vehicles);
        let price = specs.iter().find(|s| s.key == "price").unwrap();
        let brand = specs.iter().find(|s| s.key == "brand").unwrap();
        assert_eq!(PanelApp::number_hint(price).as_deref(), Some("min 0, step 1"));
        assert_eq!(PanelApp::number_hint(brand), None);
    }
}
