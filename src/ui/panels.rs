use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::model::Letter;
use crate::renderer::{ProjectionMode, RotationAxis};
use crate::ui::state::UiState;
use crate::ui::theme::*;

/// Changes requested by the panel this frame. The app maps these onto the
/// render state's setters; the panel never touches scene state directly.
#[derive(Default)]
pub struct UiActions {
    pub projection: Option<ProjectionMode>,
    pub speeds: [Option<f32>; 3],
    pub axes: [Option<RotationAxis>; 3],
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    fps: f32,
    vertex_counts: [Option<u32>; 3],
    load_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(280.0)
        .max_width(360.0)
        .default_width(300.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("HON 3D").strong());
                ui.add_space(4.0);
                ui.label(
                    RichText::new("Rotating letter viewer")
                        .color(TEXT_MUTED)
                        .size(11.0),
                );
                ui.add_space(16.0);

                projection_controls(ui, state, &mut actions);
                ui.add_space(16.0);
                ui.separator();
                ui.add_space(12.0);

                for letter in Letter::ALL {
                    letter_controls(ui, state, letter, &mut actions);
                    ui.add_space(12.0);
                }

                ui.separator();
                ui.add_space(12.0);

                ui.checkbox(&mut state.show_stats, "Stats");
                if state.show_stats {
                    ui.add_space(8.0);
                    stats_panel(ui, fps, vertex_counts);
                }

                if let Some(err) = load_error {
                    ui.add_space(12.0);
                    error_box(ui, err);
                }
            });
        });

    actions
}

fn projection_controls(ui: &mut Ui, state: &mut UiState, actions: &mut UiActions) {
    section_header(ui, "PROJECTION");
    ui.horizontal(|ui| {
        let perspective = mode_button(ui, "Perspective", state.projection == ProjectionMode::Perspective);
        if perspective.clicked() && state.projection != ProjectionMode::Perspective {
            state.projection = ProjectionMode::Perspective;
            actions.projection = Some(ProjectionMode::Perspective);
        }

        let orthographic = mode_button(ui, "Orthographic", state.projection == ProjectionMode::Orthographic);
        if orthographic.clicked() && state.projection != ProjectionMode::Orthographic {
            state.projection = ProjectionMode::Orthographic;
            actions.projection = Some(ProjectionMode::Orthographic);
        }
    });
}

fn mode_button(ui: &mut Ui, label: &str, selected: bool) -> egui::Response {
    let text = RichText::new(label).color(if selected { BG_PURE_BLACK } else { TEXT_PRIMARY });
    ui.add(
        egui::Button::new(text)
            .fill(if selected { ACCENT_SILVER } else { BG_WIDGET })
            .min_size(egui::vec2(110.0, 28.0)),
    )
}

fn letter_controls(ui: &mut Ui, state: &mut UiState, letter: Letter, actions: &mut UiActions) {
    let index = letter.index();
    section_header(ui, &format!("LETTER {}", letter.name()));

    ui.horizontal(|ui| {
        ui.label("Speed:");
        let controls = &mut state.letters[index];
        if ui
            .add(egui::Slider::new(&mut controls.speed, 0.0..=100.0))
            .changed()
        {
            actions.speeds[index] = Some(controls.speed);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Axis:");
        for axis in RotationAxis::ALL {
            let selected = state.letters[index].axis == axis;
            if ui.selectable_label(selected, axis.label()).clicked() && !selected {
                state.letters[index].axis = axis;
                actions.axes[index] = Some(axis);
            }
        }
    });
}

fn stats_panel(ui: &mut Ui, fps: f32, vertex_counts: [Option<u32>; 3]) {
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id =
                Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{fps:.0}")).color(TEXT_BRIGHT));
                ui.end_row();

                for letter in Letter::ALL {
                    ui.label(RichText::new(format!("{} vertices", letter.name())).color(TEXT_MUTED));
                    let text = match vertex_counts[letter.index()] {
                        Some(count) => RichText::new(format!("{count}")).color(TEXT_PRIMARY),
                        None => RichText::new("none").color(ACCENT_ORANGE),
                    };
                    ui.label(text);
                    ui.end_row();
                }
            });
        });
}

fn error_box(ui: &mut Ui, message: &str) {
    egui::Frame::default()
        .fill(Color32::from_rgb(40, 15, 15))
        .stroke(egui::Stroke::new(1.0, ACCENT_RED))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(message).color(ACCENT_RED).size(11.0));
        });
}

fn section_header(ui: &mut Ui, label: &str) {
    ui.label(RichText::new(label).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}
