/*!
 * Desktop viewer for hiphop-map
 *
 * A cross-platform window providing:
 * - Selecting geography, exposure metric, genres and score options
 * - Downloading the matching pre-rendered map from Dropbox
 * - Opening the rendered page in the browser, with the color legend
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use hiphop_map::error::FetchError;
use hiphop_map::models::{Aggregation, ExposureMetric, Genre, Geography, Weighting};
use hiphop_map::render::{self, LEGEND_TIERS, RenderOptions};
use hiphop_map::session::{Action, LoadRequest, Notice};
use hiphop_map::{ArtifactFetcher, Config, DropboxClient, Session};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 720.0])
            .with_min_inner_size([520.0, 420.0])
            .with_title(render::TITLE),
        ..Default::default()
    };

    eframe::run_native(
        render::TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(MapApp::new(Config::load())))),
    )
}

type LoadOutcome = (LoadRequest, Result<PathBuf, FetchError>);

/// Main application state
struct MapApp {
    session: Session,
    config: Result<Config, String>,
    // rendered page URL for the artifact it was built from
    page: Option<(String, reqwest::Url)>,
    receiver: Option<mpsc::Receiver<LoadOutcome>>,
}

impl MapApp {
    fn new(config: Result<Config, hiphop_map::error::ConfigError>) -> Self {
        let config = config.map_err(|e| {
            log::error!("configuration: {e}");
            e.to_string()
        });
        Self {
            session: Session::default(),
            config,
            page: None,
            receiver: None,
        }
    }

    fn is_loading(&self) -> bool {
        self.receiver.is_some()
    }

    fn dispatch(&mut self, action: Action) {
        self.session = std::mem::take(&mut self.session).select(action);
    }

    fn start_load(&mut self) {
        let Ok(cfg) = self.config.clone() else {
            return;
        };
        let request = self.session.begin_load();
        let (sender, receiver) = mpsc::channel();
        self.receiver = Some(receiver);

        thread::spawn(move || {
            let result = match DropboxClient::new(&cfg) {
                Ok(client) => ArtifactFetcher::new(client, cfg.folder.clone()).fetch(&request.artifact),
                Err(e) => Err(FetchError::List(e)),
            };
            let _ = sender.send((request, result));
        });
    }

    fn check_load_result(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.receiver = None;
                self.session = std::mem::take(&mut self.session)
                    .report(Notice::Error("Failed to load map: worker stopped".into()));
                return;
            }
        };
        self.receiver = None;
        let (request, result) = outcome;
        self.session = std::mem::take(&mut self.session).finish_load(request, result);
        self.render_page();
    }

    fn render_page(&mut self) {
        let Some(map) = self.session.loaded().cloned() else {
            return;
        };
        let frame_height = self
            .config
            .as_ref()
            .map(|c| c.frame_height)
            .unwrap_or(hiphop_map::config::DEFAULT_FRAME_HEIGHT);
        let opts = RenderOptions {
            frame_height,
            include_intro: false,
        };
        let out = map.path.with_extension("page.html");
        let rendered = render::render_to_file(&map.path, self.session.selection(), &out, &opts)
            .and_then(|()| render::file_url(&out));
        match rendered {
            Ok(url) => self.page = Some((map.artifact, url)),
            Err(e) => {
                self.page = None;
                self.session = std::mem::take(&mut self.session).report(Notice::render_failed(e));
            }
        }
    }

    fn selection_ui(&mut self, ui: &mut egui::Ui) {
        let current = self.session.selection().clone();

        ui.label("Choose the geographic area to view:");
        let mut geography = current.geography;
        for g in Geography::ALL {
            ui.radio_value(&mut geography, *g, g.label());
        }
        if geography != current.geography {
            self.dispatch(Action::SetGeography(geography));
        }
        ui.add_space(6.0);

        ui.label("Choose the type of exposure to display:");
        let mut exposure = current.exposure;
        for e in ExposureMetric::ALL {
            ui.radio_value(&mut exposure, *e, e.label());
        }
        if exposure != current.exposure {
            self.dispatch(Action::SetExposure(exposure));
        }
        ui.add_space(6.0);

        ui.label("Choose genres from Broadcasting & Cable to include as \"Hip Hop\" in exposure score:");
        for g in Genre::ALL {
            let mut on = current.genres.contains(*g);
            if ui.checkbox(&mut on, g.label()).changed() {
                self.dispatch(Action::ToggleGenre(*g));
            }
        }

        let selection = self.session.selection().clone();
        if selection.has_score_options() {
            ui.add_space(10.0);
            ui.strong("1997 Census Data Options:");
            if let Some(method) = render::methodology(selection.geography) {
                ui.collapsing("How the exposure score is calculated", |ui| {
                    ui.label(method);
                });
            }

            ui.label("Choose whether to sum or average:");
            let mut aggregation = selection.aggregation;
            ui.horizontal(|ui| {
                for a in Aggregation::ALL {
                    ui.radio_value(&mut aggregation, *a, a.label());
                }
            });
            if aggregation != selection.aggregation {
                self.dispatch(Action::SetAggregation(aggregation));
            }

            ui.label("Choose whether to weight by radio station rating:");
            let mut weighting = selection.weighting;
            ui.horizontal(|ui| {
                for w in Weighting::ALL {
                    ui.radio_value(&mut weighting, *w, w.label());
                }
            });
            if weighting != selection.weighting {
                self.dispatch(Action::SetWeighting(weighting));
            }
            ui.label(egui::RichText::new(render::RATING_NOTE).italics());
        }
    }

    fn map_ui(&self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(map) = self.session.loaded() else {
            return;
        };
        match self.page.as_ref().filter(|(a, _)| *a == map.artifact) {
            Some((artifact, url)) => {
                ui.group(|ui| {
                    ui.label(format!("Map: {artifact}"));
                    ui.horizontal(|ui| {
                        if ui.button("Open map").clicked() {
                            ctx.open_url(egui::OpenUrl::new_tab(url.as_str()));
                        }
                        ui.label(url.as_str());
                    });
                });
            }
            None => {
                ui.label(format!("Map: {} (not rendered)", map.artifact));
            }
        }

        if self.session.selection().shows_legend() {
            ui.add_space(8.0);
            ui.group(|ui| {
                ui.strong("Legend");
                ui.strong("1997 Hip Hop Exposure:");
                for tier in LEGEND_TIERS {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(20.0, 10.0), egui::Sense::hover());
                        let fill = egui::Color32::from_rgba_unmultiplied(
                            255,
                            0,
                            0,
                            (tier.alpha * 255.0).round() as u8,
                        );
                        ui.painter().rect_filled(rect, 0.0, fill);
                        if tier.outlined {
                            ui.painter().rect_stroke(
                                rect,
                                0.0,
                                egui::Stroke::new(1.0, egui::Color32::BLACK),
                            );
                        }
                        ui.label(tier.label);
                    });
                }
            });
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_result();

        // Request repaint if loading (for spinner animation)
        if self.is_loading() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(render::TITLE);
                ui.add_space(6.0);
                ui.collapsing("Introduction", |ui| {
                    ui.label(render::INTRODUCTION);
                });
                ui.add_space(10.0);

                // Selections are frozen while a load is in flight
                let loading = self.is_loading();
                ui.add_enabled_ui(!loading, |ui| {
                    ui.group(|ui| {
                        ui.label("Select Data Options:");
                        ui.add_space(5.0);
                        self.selection_ui(ui);
                    });
                });

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    let can_load = !loading && self.config.is_ok();
                    if ui.add_enabled(can_load, egui::Button::new("Load Map")).clicked() {
                        self.start_load();
                    }

                    if loading {
                        ui.spinner();
                        ui.label("Downloading and loading map...");
                    }
                });
                ui.label(
                    egui::RichText::new(self.session.artifact_name())
                        .small()
                        .weak(),
                );

                ui.add_space(10.0);

                if let Err(err) = &self.config {
                    ui.colored_label(egui::Color32::RED, err);
                }
                if let Some(notice) = self.session.notice() {
                    let color = if notice.is_error() {
                        egui::Color32::RED
                    } else {
                        egui::Color32::DARK_GREEN
                    };
                    ui.colored_label(color, notice.text());
                }

                self.map_ui(ui, ctx);
            });
        });
    }
}
