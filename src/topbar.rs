use egui::{Align, Color32, FontId, Layout, RichText, Sense, Stroke};

pub const TOPBAR_HEIGHT: f32 = 40.0;

#[derive(Default, Clone, Copy)]
pub struct TopBarAction {
    pub request_minimize: bool,
    pub request_close: bool,
    pub request_drag_window: bool,
}

/// Header strip: title on the left, window buttons on the right. The rest of
/// the strip drags the window.
pub fn render(ui: &mut egui::Ui, title: &str, bar_color: Color32) -> TopBarAction {
    let mut action = TopBarAction::default();
    let bar_rect = ui.max_rect();

    ui.painter().rect_filled(bar_rect, 0.0, bar_color);
    ui.painter().hline(
        bar_rect.x_range(),
        bar_rect.bottom(),
        Stroke::new(1.0, Color32::from_gray(50)),
    );

    let buttons_w = 2.0 * 18.0 + 6.0 + 16.0;
    let right_rect = egui::Rect::from_min_size(
        egui::pos2(bar_rect.right() - buttons_w, bar_rect.top()),
        egui::vec2(buttons_w, bar_rect.height()),
    );
    let left_rect = egui::Rect::from_min_size(
        bar_rect.min,
        egui::vec2((bar_rect.width() - buttons_w).max(0.0), bar_rect.height()),
    );

    let drag_response = ui.interact(
        left_rect,
        egui::Id::new("topbar_drag_area"),
        Sense::click_and_drag(),
    );
    if drag_response.drag_started() {
        action.request_drag_window = true;
    }

    ui.allocate_ui_at_rect(left_rect, |ui| {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.add_space(20.0);
            ui.label(
                RichText::new(title)
                    .size(14.0)
                    .strong()
                    .color(Color32::from_gray(230)),
            );
        });
    });

    ui.allocate_ui_at_rect(right_rect, |ui| {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 0.0);
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_space(10.0);
            let close_button = egui::Button::new(
                RichText::new("X")
                    .font(FontId::monospace(11.0))
                    .color(Color32::from_gray(230)),
            )
            .fill(Color32::from_rgb(150, 50, 50))
            .stroke(Stroke::new(1.0, Color32::from_gray(70)));
            if ui.add_sized(egui::vec2(18.0, 18.0), close_button).clicked() {
                action.request_close = true;
            }

            let min_button = egui::Button::new(
                RichText::new("-")
                    .font(FontId::monospace(12.0))
                    .color(Color32::from_gray(210)),
            )
            .fill(Color32::from_gray(35))
            .stroke(Stroke::new(1.0, Color32::from_gray(70)));
            if ui.add_sized(egui::vec2(18.0, 18.0), min_button).clicked() {
                action.request_minimize = true;
            }
        });
    });

    action
}
