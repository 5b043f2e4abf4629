use std::time::Instant;

use egui::{Color32, RichText, Stroke};

use crate::key_entry::KeyEntry;
use crate::session::{HelpOpener, SessionStarter};
use crate::store::KeyValueStore;

const CONTENT_MAX_WIDTH: f32 = 500.0;
const CONTENT_PADDING: f32 = 24.0;
const INPUT_HINT: &str = "Enter your Gemini API Key";

const INPUT_BG: Color32 = Color32::from_rgb(20, 20, 20);
const INPUT_BORDER: Color32 = Color32::from_gray(70);
const FOCUS_BORDER: Color32 = Color32::from_rgb(90, 160, 255);
const ERROR_BORDER: Color32 = Color32::from_rgb(0xff, 0x44, 0x44);
// rgba(255, 68, 68, 0.1) over the input background
const ERROR_BG: Color32 = Color32::from_rgb(44, 25, 25);
const DESCRIPTION: Color32 = Color32::from_gray(150);
const LINK: Color32 = Color32::from_rgb(140, 180, 255);

pub fn render<S, C, H>(ui: &mut egui::Ui, entry: &mut KeyEntry<S, C, H>)
where
    S: KeyValueStore,
    C: SessionStarter,
    H: HelpOpener,
{
    let area = ui.max_rect().shrink(CONTENT_PADDING);
    let content_w = area.width().min(CONTENT_MAX_WIDTH).max(0.0);
    let content_h = 140.0;
    let content_rect = egui::Rect::from_min_size(
        egui::pos2(area.left(), area.center().y - content_h * 0.5),
        egui::vec2(content_w, content_h),
    );

    ui.allocate_ui_at_rect(content_rect, |ui| {
        ui.vertical(|ui| {
            ui.label(
                RichText::new("Welcome")
                    .size(24.0)
                    .strong()
                    .color(Color32::from_gray(235)),
            );
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 12.0;
                render_key_input(ui, entry);
                render_start_button(ui, entry);
            });
            ui.add_space(20.0);

            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;
                ui.label(
                    RichText::new("Don't have an API key?")
                        .size(14.0)
                        .color(DESCRIPTION),
                );
                let link = ui.link(RichText::new("Get one here").size(14.0).color(LINK));
                if link.clicked() {
                    entry.open_help();
                }
            });
        });
    });
}

fn render_key_input<S, C, H>(ui: &mut egui::Ui, entry: &mut KeyEntry<S, C, H>)
where
    S: KeyValueStore,
    C: SessionStarter,
    H: HelpOpener,
{
    let button_w = 150.0;
    let input_w = (ui.available_width() - button_w - ui.spacing().item_spacing.x).max(120.0);

    // Frame is painted after the edit is applied so a keystroke that clears
    // the error flash never draws a red border.
    let frame_idx = ui.painter().add(egui::Shape::Noop);
    let mut text = entry.draft().to_owned();
    let response = ui.add(
        egui::TextEdit::singleline(&mut text)
            .password(true)
            .frame(false)
            .margin(egui::Margin::symmetric(8.0, 6.0))
            .hint_text(INPUT_HINT)
            .font(egui::FontId::proportional(14.0))
            .desired_width(input_w),
    );
    if response.changed() {
        entry.update_draft(text);
    }
    // A single-line edit gives up focus on Enter; keep it so the start
    // shortcut stays live.
    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        response.request_focus();
    }
    let focused = response.has_focus();
    entry.set_input_focused(focused);

    let (fill, stroke) = match (entry.error_active(), focused) {
        (true, _) => (ERROR_BG, Stroke::new(1.5, ERROR_BORDER)),
        (false, true) => (INPUT_BG, Stroke::new(1.5, FOCUS_BORDER)),
        (false, false) => (INPUT_BG, Stroke::new(1.0, INPUT_BORDER)),
    };
    let rounding = ui.visuals().widgets.inactive.rounding;
    ui.painter().set(
        frame_idx,
        egui::epaint::RectShape::new(response.rect, rounding, fill, stroke),
    );
}

fn render_start_button<S, C, H>(ui: &mut egui::Ui, entry: &mut KeyEntry<S, C, H>)
where
    S: KeyValueStore,
    C: SessionStarter,
    H: HelpOpener,
{
    let label = format!("Start Session {}", entry.shortcut_label());
    let button = egui::Button::new(
        RichText::new(label)
            .size(13.0)
            .color(Color32::WHITE),
    )
    .min_size(egui::vec2(0.0, 30.0))
    .fill(Color32::from_rgb(45, 125, 235))
    .stroke(Stroke::new(1.0, FOCUS_BORDER));

    if ui.add(button).clicked() {
        let outcome = entry.attempt_start(Instant::now());
        tracing::debug!(?outcome, "start button clicked");
    }
}
