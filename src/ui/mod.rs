//! Demo host: an eframe window driving a [`WorkspaceStore`] over a small sample project.
//!
//! The host owns no pane state of its own. It forwards input to the store, mounts pane editors by
//! handing out identifiers, awaits the store's async work on the spot, and paints whatever the
//! store reports.
//!
//! # Module Organization
//!
//! - `demo` - Sample documents, symbol provider and editor host
//! - `canvas` - Translating egui input into pointer events and camera gestures
//! - `rendering` - Drawing panes, arrows and the selection box

mod canvas;
mod demo;
mod rendering;

use self::demo::{demo_file, DemoEditorHost, DemoSymbolProvider, DEMO_FILES};
use canvas_workspace::{
    EditorIdentifier, InsertOptions, JsonFilePersistence, NavigationType, PaneKind, Theme,
    TraversalDirection, Vector, WorkspaceConfig, WorkspaceContext, WorkspaceError,
    WorkspaceStore,
};
use eframe::egui;
use futures::executor::block_on;
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

/// File the demo keeps its saved workspaces in.
const WORKSPACE_FILE: &str = "canvas_workspaces.json";

/// Viewport size used until the first frame reports the real one.
const INITIAL_VIEWPORT: Vector = Vector { x: 1280.0, y: 720.0 };

/// A keyboard or toolbar command applied to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Undo,
    Redo,
    DeleteSelection,
    SelectAll,
    ClearSelection,
    Traverse(TraversalDirection),
    Nudge(Vector, bool),
    NthPane(usize),
    TogglePin,
    ManifestGhost,
}

/// Context menu opened by a secondary click on the canvas.
#[derive(Debug, Clone, Copy)]
struct ContextMenuState {
    /// Viewport position the menu was requested at
    viewport: Vector,
    /// Skips click-outside handling on the frame the menu appears
    just_opened: bool,
}

/// The demo application.
pub struct CanvasApp {
    store: WorkspaceStore,
    next_editor: u64,
    dark_mode: bool,
    workspace_name: String,
    status: Option<String>,
    context_menu: Option<ContextMenuState>,
    held_buttons: u8,
    canvas_origin: egui::Pos2,
}

impl Default for CanvasApp {
    fn default() -> Self {
        let context = WorkspaceContext::new(WorkspaceConfig::default())
            .with_theme(Theme::Dark)
            .with_symbol_provider(Arc::new(DemoSymbolProvider))
            .with_editor_host(Arc::new(DemoEditorHost))
            .with_persistence(Arc::new(JsonFilePersistence::new(WORKSPACE_FILE)));
        let mut store = WorkspaceStore::new(context, INITIAL_VIEWPORT);
        let status = match block_on(store.load_workspaces()) {
            Ok(saved) => {
                info!("{} saved workspaces available", saved.len());
                None
            }
            Err(err) => {
                error!("failed to load saved workspaces: {err}");
                Some(err.to_string())
            }
        };

        Self {
            store,
            next_editor: 1,
            dark_mode: true,
            workspace_name: "Workspace".to_string(),
            status,
            context_menu: None,
            held_buttons: 0,
            canvas_origin: egui::Pos2::ZERO,
        }
    }
}

impl eframe::App for CanvasApp {
    /// Runs one frame: input, toolbar, canvas, then the store's pending work.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_keys(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        if self.context_menu.is_some() {
            self.draw_context_menu(ctx);
        }

        self.mount_panes();
        for id in self.store.take_close_requests() {
            block_on(self.store.close_pane(id));
        }
        block_on(self.store.settle_relationships());

        if self.store.advance() || self.store.is_animating() {
            ctx.request_repaint();
        }
    }
}

impl CanvasApp {
    /// Hands out editor identifiers to panes whose widgets just appeared.
    ///
    /// Every pane gets its own group, so saved workspaces track panes one to one.
    fn mount_panes(&mut self) {
        let unmounted: Vec<_> = self
            .store
            .panes()
            .values()
            .filter(|pane| pane.kind.awaits_identifier())
            .map(|pane| pane.id)
            .collect();
        for id in unmounted {
            let identifier = EditorIdentifier {
                group_id: self.next_editor,
                editor: self.next_editor,
            };
            self.next_editor += 1;
            self.store.set_pane_identifier(id, identifier);
        }
    }

    /// Collects keyboard shortcuts for this frame and applies them.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let commands = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let shift = i.modifiers.shift;
            let mut commands = Vec::new();

            if i.key_pressed(egui::Key::Z) && cmd && !shift {
                commands.push(Command::Undo);
            } else if (i.key_pressed(egui::Key::Z) && cmd && shift)
                || (i.key_pressed(egui::Key::Y) && cmd)
            {
                commands.push(Command::Redo);
            }
            if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
                commands.push(Command::DeleteSelection);
            }
            if i.key_pressed(egui::Key::A) && cmd {
                commands.push(Command::SelectAll);
            }
            if i.key_pressed(egui::Key::Escape) {
                commands.push(Command::ClearSelection);
            }
            if i.key_pressed(egui::Key::Tab) {
                let direction = if shift {
                    TraversalDirection::Backward
                } else {
                    TraversalDirection::Forward
                };
                commands.push(Command::Traverse(direction));
            }
            if i.key_pressed(egui::Key::P) && !cmd {
                commands.push(Command::TogglePin);
            }
            if i.key_pressed(egui::Key::Enter) {
                commands.push(Command::ManifestGhost);
            }

            let arrows = [
                (egui::Key::ArrowLeft, Vector::new(-1.0, 0.0)),
                (egui::Key::ArrowRight, Vector::new(1.0, 0.0)),
                (egui::Key::ArrowUp, Vector::new(0.0, -1.0)),
                (egui::Key::ArrowDown, Vector::new(0.0, 1.0)),
            ];
            for (key, direction) in arrows {
                if i.key_pressed(key) {
                    commands.push(Command::Nudge(direction, shift));
                }
            }

            if i.modifiers.alt {
                let digits = [
                    egui::Key::Num0,
                    egui::Key::Num1,
                    egui::Key::Num2,
                    egui::Key::Num3,
                    egui::Key::Num4,
                    egui::Key::Num5,
                    egui::Key::Num6,
                    egui::Key::Num7,
                    egui::Key::Num8,
                    egui::Key::Num9,
                ];
                for (n, key) in digits.into_iter().enumerate() {
                    if i.key_pressed(key) {
                        commands.push(Command::NthPane(n));
                    }
                }
            }
            commands
        });

        for command in commands {
            self.run_command(command);
        }
    }

    /// Applies one command to the store.
    fn run_command(&mut self, command: Command) {
        match command {
            Command::Undo => {
                block_on(self.store.undo());
            }
            Command::Redo => {
                block_on(self.store.redo());
            }
            Command::DeleteSelection => {
                let deleted = block_on(self.store.delete_selection());
                info!("deleted {deleted} panes");
            }
            Command::SelectAll => self.store.select_all(),
            Command::ClearSelection => self.store.clear_selection(),
            Command::Traverse(direction) => {
                self.store.next_pane(direction);
            }
            Command::Nudge(direction, shift) => self.store.nudge_camera(direction, shift),
            Command::NthPane(n) => {
                self.store.nth_pane_in_viewport(n);
            }
            Command::TogglePin => {
                if let Some(id) = self.store.focused() {
                    self.store.toggle_pin(id);
                }
            }
            Command::ManifestGhost => {
                if let Some(id) = self.store.focused() {
                    self.store.manifest_ghost(id);
                }
            }
        }
    }

    /// The one selected pane, if exactly one is selected.
    fn single_selection(&self) -> Option<canvas_workspace::PaneId> {
        let selection = self.store.selection();
        match selection.len() {
            1 => selection.iter().next().copied(),
            _ => None,
        }
    }

    /// Draws the toolbar: opening sample files, history, pane and workspace controls.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.menu_button("Open", |ui| {
                for file in DEMO_FILES {
                    if ui.button(file.path).clicked() {
                        block_on(self.store.insert_file_pane(
                            file.uri,
                            file.path,
                            InsertOptions::default(),
                        ));
                        ui.close();
                    }
                    for name in file.exports {
                        let Some(symbol) = file.symbol(name) else {
                            continue;
                        };
                        if ui.button(format!("{} › {}", file.path, name)).clicked() {
                            block_on(self.store.insert_symbol_pane(
                                file.uri,
                                file.path,
                                symbol,
                                InsertOptions::default(),
                            ));
                            ui.close();
                        }
                    }
                }
            });

            let beside = self.single_selection();
            ui.add_enabled_ui(beside.is_some(), |ui| {
                ui.menu_button("Open Beside", |ui| {
                    for file in DEMO_FILES {
                        if ui.button(file.path).clicked() {
                            if let Some(from) = beside {
                                block_on(self.store.insert_adjacent_pane(
                                    from,
                                    file.uri,
                                    file.path,
                                    None,
                                    InsertOptions::default(),
                                ));
                            }
                            ui.close();
                        }
                    }
                });
            });

            ui.menu_button("Peek", |ui| {
                for file in DEMO_FILES {
                    let symbol = file.exports.first().and_then(|name| file.symbol(name));
                    if ui.button(file.path).clicked() {
                        block_on(self.store.insert_ghost_pane(file.uri, file.path, symbol));
                        ui.close();
                    }
                }
            });

            ui.separator();

            ui.add_enabled_ui(self.store.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.run_command(Command::Undo);
                }
            });
            ui.add_enabled_ui(self.store.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.run_command(Command::Redo);
                }
            });

            ui.separator();

            let focused = self.store.focused();
            ui.add_enabled_ui(focused.is_some(), |ui| {
                let pinned = focused
                    .and_then(|id| self.store.pane(id))
                    .is_some_and(|pane| pane.is_pinned);
                if ui.button(if pinned { "Unpin" } else { "Pin" }).clicked() {
                    self.run_command(Command::TogglePin);
                }
                if ui.button("Center").clicked() {
                    if let Some(id) = focused {
                        self.store.navigate_to_pane(id, NavigationType::Center);
                    }
                }
            });
            ui.add_enabled_ui(!self.store.selection().is_empty(), |ui| {
                if ui.button("Delete").clicked() {
                    self.run_command(Command::DeleteSelection);
                }
            });

            ui.separator();

            if ui
                .button(if self.dark_mode { "☀ Light" } else { "🌙 Dark" })
                .clicked()
            {
                self.dark_mode = !self.dark_mode;
                let theme = if self.dark_mode {
                    Theme::Dark
                } else {
                    Theme::Light
                };
                self.store.set_theme(theme);
            }

            ui.separator();
            self.draw_workspace_controls(ui);

            if let Some(status) = &self.status {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), status);
            }
        });
    }

    /// Draws saving, opening and deleting of named workspaces.
    fn draw_workspace_controls(&mut self, ui: &mut egui::Ui) {
        ui.text_edit_singleline(&mut self.workspace_name);

        if ui.button("Save").clicked() {
            let name = self.workspace_name.trim().to_string();
            let result = block_on(self.store.save_workspace(name)).map(|_| ());
            self.report(result);
        }
        let current = self.store.current_workspace().map(|current| current.id);
        ui.add_enabled_ui(current.is_some(), |ui| {
            if ui.button("Overwrite").clicked() {
                let result = block_on(self.store.overwrite_current_workspace());
                self.report(result);
            }
            if ui.button("Delete Workspace").clicked() {
                if let Some(id) = current {
                    let result = block_on(self.store.delete_workspace(id));
                    self.report(result);
                }
            }
        });

        let selected_text = self
            .store
            .current_workspace()
            .map_or_else(|| "Open workspace…".to_string(), |current| current.name.clone());
        let saved: Vec<(Uuid, String)> = self
            .store
            .saved_workspaces()
            .iter()
            .map(|saved| (saved.id, saved.name.clone()))
            .collect();
        let mut chosen = None;
        egui::ComboBox::from_id_salt("saved_workspaces")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for (id, name) in &saved {
                    if ui.selectable_label(current == Some(*id), name).clicked() {
                        chosen = Some(*id);
                    }
                }
            });
        if let Some(id) = chosen {
            match block_on(self.store.open_workspace(id)) {
                Ok(true) => self.status = None,
                Ok(false) => self.status = Some("Opening was cancelled".to_string()),
                Err(err) => self.report(Err(err)),
            }
        }

        if self.store.is_workspace_dirty() {
            ui.label("● modified");
        }
    }

    /// Shows a failed workspace operation in the toolbar.
    fn report(&mut self, result: Result<(), WorkspaceError>) {
        match result {
            Ok(()) => self.status = None,
            Err(err) => {
                error!("workspace operation failed: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Renders the canvas context menu for opening panes at the clicked point.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    fn draw_context_menu(&mut self, ctx: &egui::Context) {
        let Some(menu) = self.context_menu else {
            return;
        };
        let screen_pos = self.canvas_origin + egui::vec2(menu.viewport.x, menu.viewport.y);
        let position = self.store.camera().to_canvas(menu.viewport);
        let options = InsertOptions {
            position: Some(position),
            ..InsertOptions::default()
        };

        let mut close = false;
        let area_response = egui::Area::new(egui::Id::new("context_menu"))
            .fixed_pos(screen_pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label("Open here:");
                        ui.separator();

                        for file in DEMO_FILES {
                            if ui.button(file.path).clicked() {
                                block_on(self.store.insert_file_pane(file.uri, file.path, options));
                                close = true;
                            }
                        }

                        ui.separator();
                        if ui.button("Settings").clicked() {
                            let size = self.store.config().default_pane_size(None);
                            self.store
                                .insert_pane_at(PaneKind::Settings, position, size, true);
                            close = true;
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                })
            });

        if !menu.just_opened && ctx.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ctx.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    close = true;
                }
            }
        }

        self.context_menu = if close {
            None
        } else {
            Some(ContextMenuState {
                just_opened: false,
                ..menu
            })
        };
    }

    /// Source lines a code pane shows, for painting its body.
    fn pane_lines(kind: &PaneKind) -> Vec<(u32, &'static str)> {
        let (uri, range) = match kind {
            PaneKind::Code { uri, .. } | PaneKind::Ghost { uri, .. } => {
                (uri.as_str(), kind.symbol_range())
            }
            _ => return Vec::new(),
        };
        let Some(file) = demo_file(uri) else {
            return Vec::new();
        };
        file.lines()
            .into_iter()
            .enumerate()
            .map(|(index, line)| (index as u32 + 1, line))
            .filter(|(line_number, _)| match range {
                Some(range) => (range.start_line..=range.end_line).contains(line_number),
                None => true,
            })
            .collect()
    }
}

/// Runs the demo window.
///
/// # Returns
///
/// Returns `Ok(())` once the window closes, or an `eframe::Error` if initialization fails.
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Canvas Workspace",
        options,
        Box::new(|_cc| Ok(Box::new(CanvasApp::default()))),
    )
}
