/*!
 * GUI application for wxchart-rs - interactive hourly weather chart
 *
 * A cross-platform desktop panel providing:
 * - Toggles for temperature, rain and snowfall with a debounced redraw
 * - One chart with a y-scale per unit, drawn in memory and shown as a texture
 * - Saving the current chart as SVG or PNG
 *
 * Usage: `wxchart-gui [config.json]`
 */

use anyhow::{Context, Result};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use wxchart_rs::api::Fetch;
use wxchart_rs::config::{LocationMode, WidgetConfig};
use wxchart_rs::panel::CycleRequest;
use wxchart_rs::viz::{self, ChartSurface, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use wxchart_rs::{ChartError, ChartState, Client, ControlPanel, LabelStyle, RawPayload};

type FetchResult = (u64, Result<RawPayload, ChartError>);

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let widget = match std::env::args().nth(1) {
        Some(path) => load_config(&path).unwrap_or_else(|e| {
            log::warn!("ignoring config: {e:#}");
            WidgetConfig::default()
        }),
        None => WidgetConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1060.0, 640.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Hourly forecast - wxchart-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "wxchart",
        options,
        Box::new(|_cc| Ok(Box::new(WxApp::new(widget)))),
    )
}

fn load_config(path: &str) -> Result<WidgetConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    Ok(WidgetConfig::from_json_str(&text)?)
}

/// Main application state
struct WxApp {
    widget: WidgetConfig,
    locale: String,
    model: String,
    title: String,

    panel: ControlPanel,
    texture: Option<egui::TextureHandle>,
    texture_for: Option<u64>,

    // Background fetches report here, tagged with their cycle.
    sender: mpsc::Sender<FetchResult>,
    receiver: mpsc::Receiver<FetchResult>,

    status_message: String,
    error_message: String,
}

impl WxApp {
    fn new(widget: WidgetConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        let locale = "en".to_string();
        let model = widget.models.clone().unwrap_or_default();
        let title = widget.title.clone().unwrap_or_default();
        let panel = build_panel(&widget, &locale);
        Self {
            widget,
            locale,
            model,
            title,
            panel,
            texture: None,
            texture_for: None,
            sender,
            receiver,
            status_message: String::new(),
            error_message: String::new(),
        }
    }

    /// Reconfigure the panel after the advanced options changed; keeps the toggles.
    fn apply_options(&mut self) {
        self.widget.models = Some(self.model.trim().to_string()).filter(|m| !m.is_empty());
        self.widget.title = Some(self.title.trim().to_string()).filter(|t| !t.is_empty());
        self.widget.hourly = self.panel.selected();
        self.panel.reconfigure(
            self.widget.to_request_config(),
            self.widget.request_builder(),
            chart_surface(&self.locale),
            LabelStyle::for_locale(&self.locale),
            Instant::now(),
        );
        self.texture = None;
        self.texture_for = None;
    }

    fn spawn_fetch(&self, req: CycleRequest) {
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = Client::default().fetch_payload(&req.url);
            let _ = sender.send((req.generation, result));
        });
    }

    fn check_fetch_results(&mut self) {
        while let Ok((generation, result)) = self.receiver.try_recv() {
            self.panel.complete(generation, result);
        }
    }

    /// Upload the current chart pixels when the handle changed.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let current = self.panel.chart().map(|h| h.id());
        if current == self.texture_for {
            return;
        }
        self.texture_for = current;
        self.texture = self.panel.chart().and_then(|h| h.image()).map(|img| {
            let image = egui::ColorImage::from_rgb(
                [img.width as usize, img.height as usize],
                &img.rgb,
            );
            ctx.load_texture("weather-chart", image, egui::TextureOptions::LINEAR)
        });
    }

    fn save_chart(&mut self) {
        let Some(handle) = self.panel.chart() else {
            return;
        };
        let start_dir = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let Some(path) = rfd::FileDialog::new()
            .set_directory(start_dir)
            .set_file_name("weather.svg")
            .add_filter("SVG", &["svg"])
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            return;
        };
        let (w, h) = self.panel.surface().size();
        match viz::export(handle.config(), &path, w, h, &self.locale) {
            Ok(()) => {
                self.status_message = format!("Saved chart to {}", path.display());
                self.error_message.clear();
            }
            Err(err) => {
                self.error_message = format!("Failed to save chart: {err}");
                self.status_message.clear();
            }
        }
    }
}

fn chart_surface(locale: &str) -> ChartSurface {
    ChartSurface::memory(DEFAULT_WIDTH, DEFAULT_HEIGHT).with_locale(locale)
}

fn build_panel(widget: &WidgetConfig, locale: &str) -> ControlPanel {
    ControlPanel::new(
        widget.to_request_config(),
        widget.request_builder(),
        chart_surface(locale),
        Instant::now(),
    )
    .with_label_style(LabelStyle::for_locale(locale))
}

impl eframe::App for WxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.check_fetch_results();
        if let Some(req) = self.panel.poll(now) {
            self.spawn_fetch(req);
        }
        self.sync_texture(ctx);

        // Wake up for the debounce deadline and while a fetch is running
        if let Some(wait) = self.panel.time_until_due(now) {
            ctx.request_repaint_after(wait);
        }
        if self.panel.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Hourly forecast");
            ui.add_space(6.0);

            let options: Vec<_> = self.panel.options().collect();
            ui.horizontal_wrapped(|ui| {
                for (option, on) in options {
                    let mut checked = on;
                    if ui.checkbox(&mut checked, option.label).changed() {
                        self.panel.set_checked(option.parameter, checked, Instant::now());
                    }
                }
            });

            ui.collapsing("Advanced Options", |ui| {
                ui.horizontal(|ui| {
                    ui.label("Model:");
                    ui.text_edit_singleline(&mut self.model)
                        .on_hover_text("Optional weather model (e.g., bom_access_global)");
                });
                ui.horizontal(|ui| {
                    ui.label("Chart title:");
                    ui.text_edit_singleline(&mut self.title);
                });
                ui.horizontal(|ui| {
                    ui.label("Locale:");
                    egui::ComboBox::from_label("")
                        .selected_text(&self.locale)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.locale, "en".to_string(), "English (en)");
                            ui.selectable_value(&mut self.locale, "de".to_string(), "German (de)");
                            ui.selectable_value(&mut self.locale, "fr".to_string(), "French (fr)");
                        });
                });
                ui.horizontal(|ui| {
                    ui.label("Location:");
                    ui.radio_value(&mut self.widget.location, LocationMode::Pinned, "Pinned");
                    ui.radio_value(
                        &mut self.widget.location,
                        LocationMode::Configured,
                        "Configured",
                    );
                });
                if self.widget.location == LocationMode::Configured {
                    ui.horizontal(|ui| {
                        let lat = self.widget.latitude.get_or_insert(0.0);
                        ui.label("Latitude:");
                        ui.add(egui::DragValue::new(lat).range(-90.0..=90.0).speed(0.01));
                    });
                    ui.horizontal(|ui| {
                        let lon = self.widget.longitude.get_or_insert(0.0);
                        ui.label("Longitude:");
                        ui.add(egui::DragValue::new(lon).range(-180.0..=180.0).speed(0.01));
                    });
                }
                if ui.button("Apply").clicked() {
                    self.apply_options();
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.panel.chart().is_some(), egui::Button::new("Save chart"))
                    .clicked()
                {
                    self.save_chart();
                }
                if self.panel.is_loading() {
                    ui.spinner();
                }
            });

            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
            ui.add_space(8.0);

            match self.panel.state() {
                ChartState::Ready { .. } => {
                    if let Some(tex) = &self.texture {
                        ui.add(egui::Image::new(tex).shrink_to_fit());
                    }
                }
                ChartState::Error { message } => {
                    ui.colored_label(egui::Color32::from_rgb(220, 20, 60), message);
                }
                state => {
                    if let Some(msg) = state.message() {
                        ui.colored_label(egui::Color32::GRAY, msg);
                    }
                }
            }
        });
    }
}
