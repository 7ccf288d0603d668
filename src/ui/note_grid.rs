// Note grid - Paints one measure of sticking with the playhead on top

use crate::sequencer::measure::Measure;
use crate::sequencer::rudiment::{Hand, NoteType};
use crate::sequencer::sync::FrameState;
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

const ACCENT_COLOR: Color32 = Color32::from_rgb(255, 200, 100);
const RIGHT_COLOR: Color32 = Color32::from_rgb(100, 150, 255);
const LEFT_COLOR: Color32 = Color32::from_rgb(120, 220, 140);
const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(255, 100, 100);

/// Read-only measure view
pub struct NoteGrid {
    height: f32,
}

impl Default for NoteGrid {
    fn default() -> Self {
        Self { height: 140.0 }
    }
}

impl NoteGrid {
    pub fn show(&self, ui: &mut Ui, measure: &Measure, frame: &FrameState) {
        let width = ui.available_width().max(200.0);
        let (response, painter) = ui.allocate_painter(Vec2::new(width, self.height), Sense::hover());
        let rect = response.rect;

        painter.rect_filled(rect, 4.0, Color32::from_gray(30));
        if measure.notes.is_empty() {
            return;
        }

        let slot_width = rect.width() / measure.notes.len() as f32;
        let slots_per_beat = measure.slots_per_beat().max(1) as usize;

        self.draw_beat_lines(&painter, rect, measure, slot_width, slots_per_beat);

        for (index, note) in measure.notes.iter().enumerate() {
            let x = rect.left() + (index as f32 + 0.5) * slot_width;
            let is_active = frame.active_note == Some(index);

            if is_active {
                let cell = Rect::from_min_size(
                    Pos2::new(rect.left() + index as f32 * slot_width, rect.top()),
                    Vec2::new(slot_width, rect.height()),
                );
                painter.rect_filled(cell, 0.0, Color32::from_gray(55));
            }

            if note.is_rest() {
                painter.circle_stroke(
                    Pos2::new(x, rect.center().y),
                    slot_width.min(24.0) * 0.2,
                    Stroke::new(1.0, Color32::from_gray(90)),
                );
                continue;
            }

            let color = match note.hand {
                Hand::Right => RIGHT_COLOR,
                Hand::Left => LEFT_COLOR,
                Hand::Ghost => Color32::from_gray(90),
            };
            let radius = match note.note_type {
                NoteType::Accent => slot_width.min(24.0) * 0.45,
                NoteType::Ghost => slot_width.min(24.0) * 0.2,
                _ => slot_width.min(24.0) * 0.32,
            };
            let center = Pos2::new(x, rect.center().y);
            painter.circle_filled(center, radius, color);
            if note.note_type == NoteType::Accent {
                painter.text(
                    Pos2::new(x, rect.top() + 14.0),
                    Align2::CENTER_CENTER,
                    ">",
                    FontId::proportional(16.0),
                    ACCENT_COLOR,
                );
            }
            if matches!(note.note_type, NoteType::Flam | NoteType::Drag) {
                painter.circle_filled(
                    Pos2::new(x - radius, center.y - radius),
                    radius * 0.4,
                    color,
                );
            }

            painter.text(
                Pos2::new(x, rect.bottom() - 14.0),
                Align2::CENTER_CENTER,
                note.hand.symbol(),
                FontId::monospace(14.0),
                if is_active {
                    Color32::WHITE
                } else {
                    Color32::from_gray(160)
                },
            );
        }

        // Playhead only while a sync anchor drives it
        if frame.active_note.is_some() {
            let x = rect.left() + frame.progress as f32 * rect.width();
            painter.line_segment(
                [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                Stroke::new(2.0, PLAYHEAD_COLOR),
            );
        }
    }

    fn draw_beat_lines(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        measure: &Measure,
        slot_width: f32,
        slots_per_beat: usize,
    ) {
        for slot in 0..=measure.notes.len() {
            let x = rect.left() + slot as f32 * slot_width;
            let stroke = if slot % slots_per_beat == 0 {
                (2.0, Color32::from_gray(80))
            } else {
                (1.0, Color32::from_gray(45))
            };
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        }
    }
}
