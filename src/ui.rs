use crate::calculator::{FEE_RATE, MIN_LISTING_PRICE};
use crate::config::AppConfig;
use crate::controller::{calculate, format_amount, save_item, AppState, Outcome};
use crate::model::{Collection, Mode};
use crate::shipping::ShippingOption;
use crate::store::{DeleteAction, ListSnapshot, RecordStore};
use eframe::egui;
use egui::{Color32, Context, FontFamily, FontId, Margin, RichText, Stroke, Vec2, Visuals};
use egui_extras::{Column, TableBuilder};
use tracing::{info, warn};

const ACCENT: Color32 = Color32::from_rgb(255, 90, 90);
const MUTED: Color32 = Color32::from_rgb(150, 150, 160);
const PROFIT: Color32 = Color32::from_rgb(110, 220, 140);
const LOSS: Color32 = Color32::from_rgb(255, 110, 110);

pub fn set_custom_style(ctx: &Context) {
    let mut visuals = Visuals::dark();

    visuals.panel_fill = Color32::from_rgb(24, 24, 28);
    visuals.window_fill = Color32::from_rgb(30, 30, 36);
    visuals.extreme_bg_color = Color32::from_rgb(38, 38, 46);
    visuals.faint_bg_color = Color32::from_rgb(34, 34, 40);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(48, 48, 58);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(70, 70, 84));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(66, 56, 62);
    visuals.widgets.hovered.bg_stroke = Stroke::new(2.0, Color32::from_rgb(220, 110, 110));

    visuals.widgets.active.bg_fill = Color32::from_rgb(90, 56, 60);
    visuals.widgets.active.bg_stroke = Stroke::new(2.0, ACCENT);

    visuals.selection.bg_fill = Color32::from_rgb(120, 50, 55);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);

    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        FontId::new(15.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

pub struct FeeCalcApp {
    state: AppState,
    options: Vec<ShippingOption>,
    store: RecordStore,

    // Derived from state/store; refreshed on change
    outcome: Outcome,
    history: ListSnapshot,
    inventory: ListSnapshot,

    status: Option<(String, bool)>,
}

impl FeeCalcApp {
    pub fn new(config: AppConfig, store: RecordStore) -> Self {
        let options = config.shipping_options;
        let state = AppState::new(&options);
        let outcome = calculate(&state, &options);
        let history = store.snapshot(Collection::History);
        let inventory = store.snapshot(Collection::Inventory);

        Self {
            state,
            options,
            store,
            outcome,
            history,
            inventory,
            status: None,
        }
    }

    fn recalculate(&mut self) {
        self.outcome = calculate(&self.state, &self.options);
    }

    fn reload(&mut self, collection: Collection) {
        let snapshot = self.store.snapshot(collection);
        match collection {
            Collection::History => self.history = snapshot,
            Collection::Inventory => self.inventory = snapshot,
        }
    }

    fn save(&mut self, to_inventory: bool) {
        match save_item(&mut self.state, &self.options, &mut self.store, to_inventory) {
            Ok(record) => {
                let collection = if to_inventory {
                    Collection::Inventory
                } else {
                    Collection::History
                };
                self.reload(collection);
                self.status = Some((
                    format!("Saved \"{}\" to {}", record.memo, collection.title().to_lowercase()),
                    false,
                ));
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                self.status = Some((e.to_string(), true));
            }
        }
    }

    fn delete(&mut self, action: DeleteAction) {
        match self.store.delete_entry(&action) {
            Ok(record) => {
                info!("Deleted \"{}\" from {}", record.memo, action.collection.title());
                self.status = Some((format!("Deleted \"{}\"", record.memo), false));
            }
            Err(e) => {
                warn!("Delete failed: {}", e);
                self.status = Some((e.to_string(), true));
            }
        }
        self.reload(action.collection);
    }

    fn mode_switch(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            let modes = [
                (Mode::ReverseFromTarget, "🎯 Payout → Price"),
                (Mode::ForwardFromPrice, "🏷 Price → Payout"),
            ];
            for (mode, label) in modes {
                let active = self.state.mode == mode;
                let text = if active {
                    RichText::new(label).color(ACCENT).strong()
                } else {
                    RichText::new(label)
                };
                if ui.selectable_label(active, text).clicked() && !active {
                    self.state.switch_mode(mode);
                    changed = true;
                }
            }
        });
        changed
    }

    fn inputs(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        match self.state.mode {
            Mode::ReverseFromTarget => {
                ui.label(RichText::new("Target payout").strong());
                changed |= ui
                    .add(
                        egui::TextEdit::singleline(&mut self.state.target_input)
                            .hint_text("e.g. 1000")
                            .desired_width(200.0),
                    )
                    .changed();
            }
            Mode::ForwardFromPrice => {
                ui.label(RichText::new("Listing price").strong());
                changed |= ui
                    .add(
                        egui::TextEdit::singleline(&mut self.state.price_input)
                            .hint_text(format!("{MIN_LISTING_PRICE} or more"))
                            .desired_width(200.0),
                    )
                    .changed();
            }
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Shipping").strong());

        let selected_label = self
            .options
            .get(self.state.shipping_index)
            .map(|o| o.label.clone())
            .unwrap_or_default();

        egui::ComboBox::from_id_salt("shipping")
            .selected_text(selected_label)
            .width(200.0)
            .show_ui(ui, |ui| {
                for (i, option) in self.options.iter().enumerate() {
                    let selected = self.state.shipping_index == i;
                    if ui.selectable_label(selected, &option.label).clicked() {
                        self.state.on_shipping_change(&self.options, i);
                        changed = true;
                    }
                }
            });

        if self.state.manual_shipping_visible(&self.options) {
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut self.state.manual_shipping_input)
                        .hint_text("Shipping fee")
                        .desired_width(200.0),
                )
                .changed();
        }

        changed
    }

    fn results(&self, ui: &mut egui::Ui) {
        egui::Frame::new()
            .fill(Color32::from_rgb(34, 34, 40))
            .stroke(Stroke::new(1.0, Color32::from_rgb(70, 70, 84)))
            .inner_margin(Margin::same(12))
            .show(ui, |ui| {
                match self.state.mode {
                    Mode::ReverseFromTarget => {
                        ui.label(RichText::new("Listing price").color(MUTED));
                        ui.label(
                            RichText::new(self.outcome.price_text())
                                .size(28.0)
                                .color(ACCENT)
                                .strong(),
                        );
                    }
                    Mode::ForwardFromPrice => {
                        ui.label(RichText::new("Payout").color(MUTED));
                        let color = match self.outcome.quote() {
                            Some(q) if q.profit() < 0 => LOSS,
                            Some(_) => PROFIT,
                            None => ACCENT,
                        };
                        ui.label(
                            RichText::new(self.outcome.profit_text())
                                .size(28.0)
                                .color(color)
                                .strong(),
                        );
                    }
                }

                ui.separator();
                egui::Grid::new("breakdown").num_columns(2).show(ui, |ui| {
                    ui.label(format!("Fee ({}%)", FEE_RATE.percent()));
                    ui.label(self.outcome.fee_text());
                    ui.end_row();

                    ui.label("Shipping");
                    ui.label(self.outcome.shipping_text());
                    ui.end_row();

                    if let Some(q) = self.outcome.quote() {
                        ui.label("You receive");
                        ui.label(format_amount(q.net_payout()));
                        ui.end_row();
                    }
                });
            });
    }

    fn saved_list(&self, ui: &mut egui::Ui, collection: Collection) -> Option<DeleteAction> {
        let snapshot = match collection {
            Collection::History => &self.history,
            Collection::Inventory => &self.inventory,
        };

        let entries = match snapshot {
            ListSnapshot::Empty(message) => {
                ui.label(RichText::new(*message).color(MUTED).italics());
                return None;
            }
            ListSnapshot::Entries(entries) => entries,
        };
        let small = |text: String| RichText::new(text).small().color(MUTED);

        let mut pending = None;

        ui.push_id(collection.storage_key(), |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                // Memo + date + shipping
                .column(Column::remainder().at_least(160.0).clip(true))
                .column(Column::exact(130.0)) // Price + fee
                .column(Column::exact(90.0)) // Payout
                .column(Column::exact(40.0)) // Delete
                .body(|body| {
                    body.rows(58.0, entries.len(), |mut row| {
                        let entry = &entries[row.index()];
                        let r = &entry.record;

                        row.col(|ui| {
                            ui.vertical(|ui| {
                                ui.label(RichText::new(&r.memo).strong());
                                ui.label(small(format!("Saved {}", r.date)));
                                let amount = format_amount(r.shipping);
                                let shipping = match collection {
                                    Collection::Inventory => {
                                        format!("{} ({amount})", r.shipping_method)
                                    }
                                    Collection::History => format!("Shipping: {amount}"),
                                };
                                ui.label(small(shipping));
                            });
                        });

                        row.col(|ui| {
                            ui.vertical(|ui| {
                                ui.label(format_amount(r.price));
                                ui.label(small(format!("fee {}", r.fee)));
                            });
                        });

                        row.col(|ui| {
                            let color = if r.profit < 0 { LOSS } else { PROFIT };
                            let payout = RichText::new(format_amount(r.profit));
                            ui.label(payout.color(color).strong());
                        });

                        row.col(|ui| {
                            if ui.button("🗑").on_hover_text("Delete").clicked() {
                                pending = Some(entry.delete);
                            }
                        });
                    });
                });
        });

        pending
    }
}

impl eframe::App for FeeCalcApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(
                    RichText::new("Listing Fee Calculator")
                        .color(ACCENT)
                        .strong()
                        .size(22.0),
                );
                ui.separator();
                let fee_note = format!("Marketplace fee: {}%", FEE_RATE.percent());
                ui.label(RichText::new(fee_note).color(MUTED));
            });
            ui.add_space(4.0);
        });

        let mut pending_delete = None;

        egui::SidePanel::right("saved")
            .min_width(420.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for collection in Collection::ALL {
                        let count = match collection {
                            Collection::History => self.history.entries().len(),
                            Collection::Inventory => self.inventory.entries().len(),
                        };
                        egui::CollapsingHeader::new(
                            RichText::new(format!("{} ({})", collection.title(), count)).strong(),
                        )
                        .id_salt(collection.storage_key())
                        .default_open(true)
                        .show(ui, |ui| {
                            if let Some(action) = self.saved_list(ui, collection) {
                                pending_delete = Some(action);
                            }
                        });
                        ui.add_space(8.0);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut changed = self.mode_switch(ui);
            ui.add_space(10.0);

            changed |= self.inputs(ui);
            if changed {
                self.recalculate();
            }

            ui.add_space(12.0);
            self.results(ui);

            ui.add_space(12.0);
            ui.label(RichText::new("Memo").strong());
            ui.add(
                egui::TextEdit::singleline(&mut self.state.memo)
                    .hint_text("Item name")
                    .desired_width(300.0),
            );

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let can_save = self.outcome.quote().is_some();
                let size = Vec2::new(150.0, 32.0);
                let to_history = egui::Button::new("💾 Save to history").min_size(size);
                if ui.add_enabled(can_save, to_history).clicked() {
                    self.save(false);
                }
                let to_inventory = egui::Button::new("📦 Save to inventory").min_size(size);
                if ui.add_enabled(can_save, to_inventory).clicked() {
                    self.save(true);
                }
            });

            if let Some((message, is_error)) = &self.status {
                ui.add_space(6.0);
                let color = if *is_error { LOSS } else { MUTED };
                ui.label(RichText::new(message).color(color));
            }
        });

        if let Some(action) = pending_delete {
            self.delete(action);
        }
    }
}
