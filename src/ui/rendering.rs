//! Painting the workspace: panes, dependency arrows and the rubber-band selection.
//!
//! Everything the store reports is already in viewport space; painting only offsets it by the
//! canvas origin. Layers from back to front are canvas panes by z-index, arrows, pinned panes,
//! then the selection box.

use super::CanvasApp;
use canvas_workspace::{Pane, PaneId, PaneKind, Rect, Vector};
use eframe::egui;
use eframe::epaint::StrokeKind;
use std::collections::HashMap;
use std::sync::Arc;

const PANE_CORNER_RADIUS: f32 = 4.0;
const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);
const FOCUS_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 60);
const HIGHLIGHT_ALPHA: u8 = 48;

/// Theme-dependent colors for pane chrome.
struct Chrome {
    background: egui::Color32,
    pane_fill: egui::Color32,
    header_fill: egui::Color32,
    text: egui::Color32,
    muted: egui::Color32,
    border: egui::Color32,
}

impl Chrome {
    fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                background: egui::Color32::from_rgb(24, 24, 28),
                pane_fill: egui::Color32::from_rgb(34, 34, 40),
                header_fill: egui::Color32::from_rgb(48, 48, 56),
                text: egui::Color32::from_gray(220),
                muted: egui::Color32::from_gray(120),
                border: egui::Color32::from_gray(70),
            }
        } else {
            Self {
                background: egui::Color32::from_rgb(236, 236, 240),
                pane_fill: egui::Color32::WHITE,
                header_fill: egui::Color32::from_rgb(222, 222, 230),
                text: egui::Color32::from_gray(30),
                muted: egui::Color32::from_gray(140),
                border: egui::Color32::from_gray(180),
            }
        }
    }
}

impl CanvasApp {
    /// Renders every workspace layer into the canvas area.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    /// * `show_numbers` - Draw reading-order numbers on visible panes
    pub(super) fn render_workspace(
        &mut self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        show_numbers: bool,
    ) {
        let chrome = Chrome::new(self.dark_mode);
        painter.rect_filled(canvas_rect, 0.0, chrome.background);

        let panes = Arc::clone(self.store.panes());
        let mut ordered: Vec<&Pane> = panes.values().collect();
        ordered.sort_by_key(|pane| (pane.is_pinned, pane.z_index, pane.id));

        let numbers: HashMap<PaneId, usize> = if show_numbers {
            ordered
                .iter()
                .filter_map(|pane| {
                    self.store
                        .enumeration_in_viewport(pane.id)
                        .map(|n| (pane.id, n))
                })
                .collect()
        } else {
            HashMap::new()
        };

        let painter = painter.with_clip_rect(canvas_rect);
        let (pinned, unpinned): (Vec<&Pane>, Vec<&Pane>) =
            ordered.into_iter().partition(|pane| pane.is_pinned);

        for pane in unpinned {
            self.draw_pane(&painter, &chrome, pane, numbers.get(&pane.id).copied());
        }
        self.draw_arrows(&painter);
        for pane in pinned {
            self.draw_pane(&painter, &chrome, pane, numbers.get(&pane.id).copied());
        }

        if let Some(selection_box) = self.store.selection_box() {
            let rect = self.to_screen_rect(&selection_box);
            painter.rect_filled(rect, 0.0, SELECTION_COLOR.gamma_multiply(0.15));
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(1.0, SELECTION_COLOR),
                StrokeKind::Inside,
            );
        }
    }

    /// Draws one pane: body, header, code lines and selection border.
    fn draw_pane(
        &self,
        painter: &egui::Painter,
        chrome: &Chrome,
        pane: &Pane,
        number: Option<usize>,
    ) {
        let camera = self.store.camera();
        let config = self.store.config();
        let zoom = if pane.is_pinned { 1.0 } else { camera.scale };
        let opacity = if pane.is_ghost || pane.kind.is_ghost() {
            0.6
        } else {
            1.0
        };

        let rect = self.to_screen_rect(&pane.viewport_rect(&camera));
        let header = self.to_screen_rect(&pane.header_rect(&camera, config.header_height));
        painter.rect_filled(
            rect,
            PANE_CORNER_RADIUS,
            chrome.pane_fill.gamma_multiply(opacity),
        );
        painter.rect_filled(
            header,
            PANE_CORNER_RADIUS,
            chrome.header_fill.gamma_multiply(opacity),
        );

        let title_font = egui::FontId::proportional((12.0 * zoom).clamp(6.0, 32.0));
        let mut title = pane_title(&pane.kind);
        if pane.is_dirty {
            title.push_str(" ●");
        }
        if pane.is_pinned {
            title.push_str(" 📌");
        }
        painter.with_clip_rect(header).text(
            egui::pos2(header.left() + 8.0 * zoom, header.center().y),
            egui::Align2::LEFT_CENTER,
            title,
            title_font.clone(),
            chrome.text,
        );
        if let Some(number) = number {
            painter.text(
                egui::pos2(header.right() - 8.0 * zoom, header.center().y),
                egui::Align2::RIGHT_CENTER,
                number.to_string(),
                title_font,
                FOCUS_COLOR,
            );
        }

        let body = egui::Rect::from_min_max(egui::pos2(rect.left(), header.bottom()), rect.max);
        let body_painter = painter.with_clip_rect(body.intersect(painter.clip_rect()));
        self.draw_code(&body_painter, chrome, pane, body, zoom);

        let (stroke_color, stroke_width) = if self.store.focused() == Some(pane.id) {
            (FOCUS_COLOR, 2.0)
        } else if self.store.selection().contains(&pane.id) {
            (SELECTION_COLOR, 2.0)
        } else {
            (chrome.border, 1.0)
        };
        painter.rect_stroke(
            rect,
            PANE_CORNER_RADIUS,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );
    }

    /// Draws the source lines of code and ghost panes, tinting reference sites.
    fn draw_code(
        &self,
        painter: &egui::Painter,
        chrome: &Chrome,
        pane: &Pane,
        body: egui::Rect,
        zoom: f32,
    ) {
        let lines = Self::pane_lines(&pane.kind);
        let Some(&(first_line, _)) = lines.first() else {
            return;
        };
        let config = self.store.config();
        let row_height = config.line_height * zoom;
        let gutter = config.gutter_width * zoom;
        let font = egui::FontId::monospace((config.line_height * 0.7 * zoom).max(1.0));

        let row_rect = |line: u32| {
            let top = body.top() + (line - first_line) as f32 * row_height;
            egui::Rect::from_min_size(
                egui::pos2(body.left(), top),
                egui::vec2(body.width(), row_height),
            )
        };
        let last_line = first_line + lines.len() as u32 - 1;

        if let Some(targets) = self.store.highlight_colors().get(&pane.id) {
            for assignment in targets.values() {
                let color = color32(assignment.color);
                let tint = egui::Color32::from_rgba_unmultiplied(
                    color.r(),
                    color.g(),
                    color.b(),
                    HIGHLIGHT_ALPHA,
                );
                for range in &assignment.from_ranges {
                    let start = range.start_line.max(first_line);
                    let end = range.end_line.min(last_line);
                    for line in start..=end {
                        painter.rect_filled(row_rect(line), 0.0, tint);
                    }
                }
            }
        }

        for (line, text) in lines {
            let row = row_rect(line);
            if row.top() > body.bottom() {
                break;
            }
            painter.text(
                egui::pos2(row.left() + gutter - 6.0 * zoom, row.center().y),
                egui::Align2::RIGHT_CENTER,
                line.to_string(),
                font.clone(),
                chrome.muted,
            );
            painter.text(
                egui::pos2(row.left() + gutter, row.center().y),
                egui::Align2::LEFT_CENTER,
                text,
                font.clone(),
                chrome.text,
            );
        }
    }

    /// Draws every dependency arrow from the store's stroke primitives.
    fn draw_arrows(&self, painter: &egui::Painter) {
        for stroke in self.store.arrow_strokes() {
            let color = color32(stroke.color);
            let line = egui::Stroke::new(stroke.width, color);
            for (from, to) in &stroke.segments {
                painter.line_segment([self.to_screen(*from), self.to_screen(*to)], line);
            }
            if let Some(circle) = stroke.circle {
                painter.circle_filled(self.to_screen(circle.center), circle.radius, color);
            }
        }
    }

    /// Converts a viewport point to a screen position.
    fn to_screen(&self, point: Vector) -> egui::Pos2 {
        self.canvas_origin + egui::vec2(point.x, point.y)
    }

    /// Converts a viewport rectangle to a screen rectangle.
    fn to_screen_rect(&self, rect: &Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.to_screen(rect.top_left()),
            self.to_screen(rect.bottom_right()),
        )
    }
}

/// Header text for a pane.
fn pane_title(kind: &PaneKind) -> String {
    match kind {
        PaneKind::Code {
            file_path, symbol, ..
        }
        | PaneKind::Ghost {
            file_path, symbol, ..
        } => match symbol {
            Some(symbol) => format!("{} › {}", file_path, symbol.name),
            None => file_path.clone(),
        },
        PaneKind::Diff { file_path, .. } => format!("{file_path} (diff)"),
        PaneKind::Modal { title, .. } => title.clone(),
        PaneKind::Merge { uri, .. } => format!("Merge {uri}"),
        PaneKind::References { uri, .. } => format!("References in {uri}"),
        PaneKind::Settings => "Settings".to_string(),
        PaneKind::Keybindings => "Keybindings".to_string(),
    }
}

/// Converts 0xRRGGBB to an opaque egui color.
fn color32(rgb: u32) -> egui::Color32 {
    egui::Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_workspace::{PaneSymbol, TextRange};

    #[test]
    fn test_color32_unpacks_rgb() {
        assert_eq!(color32(0x3366cc), egui::Color32::from_rgb(0x33, 0x66, 0xcc));
    }

    #[test]
    fn test_symbol_pane_title_names_symbol() {
        let kind = PaneKind::Code {
            uri: "file:///demo/src/server.rs".into(),
            file_path: "src/server.rs".into(),
            symbol: Some(PaneSymbol {
                name: "Server".into(),
                range: TextRange::lines(4, 7),
            }),
            edit_range: None,
            identifier: None,
        };
        assert_eq!(pane_title(&kind), "src/server.rs › Server");
        assert_eq!(pane_title(&PaneKind::Settings), "Settings");
    }
}
