// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main editor application setup and event loop.

use crate::state::EditorState;
use egui_wgpu::wgpu;
use plume_editor_graph::ui::CanvasView;
use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Editor application errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find suitable GPU adapter");

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Plume Editor Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    #[allow(unsafe_code)] // Workaround for wgpu 23 lifetime issue with RenderPass
    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Editor Encoder"),
            });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        // wgpu 23 has a 'static lifetime bound issue with RenderPass
        // We work around this using raw pointers
        let encoder_ptr = Box::into_raw(Box::new(encoder));

        {
            // SAFETY: encoder_ptr is valid and we'll properly reclaim it after the render_pass is dropped
            let encoder_ref: &'static mut wgpu::CommandEncoder = unsafe { &mut *encoder_ptr };

            let mut render_pass = encoder_ref.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Editor Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.08,
                            g: 0.08,
                            b: 0.09,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
            // render_pass is dropped here
        }

        // SAFETY: We're reclaiming the Box after render_pass is dropped
        let encoder = unsafe { Box::from_raw(encoder_ptr) };

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// Simple file dialog state
#[derive(Debug, Clone, PartialEq)]
enum FileDialogMode {
    None,
    Open,
    SaveAs,
    ExportJson,
}

/// Inner editor UI state
struct EditorUi {
    state: EditorState,
    canvas_view: CanvasView,
    /// Filter for the Insert menu's template list
    template_search: String,
    /// File dialog mode
    file_dialog_mode: FileDialogMode,
    /// File dialog path input
    file_dialog_path: String,
    /// Show unsaved changes warning
    show_unsaved_warning: bool,
    /// Pending action after unsaved warning
    pending_action: Option<Box<dyn FnOnce(&mut EditorUi) + Send + Sync>>,
    /// Whether the app should exit (set by unsaved changes dialog)
    request_exit: bool,
}

impl EditorUi {
    fn new() -> Self {
        Self {
            state: EditorState::new(),
            canvas_view: CanvasView::new(),
            template_search: String::new(),
            file_dialog_mode: FileDialogMode::None,
            file_dialog_path: String::new(),
            show_unsaved_warning: false,
            pending_action: None,
            request_exit: false,
        }
    }

    fn update(&mut self, ctx: &egui::Context) {
        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.file_menu(ui);
                self.insert_menu(ui);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mut title = self.state.playbook_name();
                    if self.state.has_unsaved_changes() {
                        title.push_str(" (modified)");
                    }
                    ui.label(egui::RichText::new(title).color(egui::Color32::from_gray(180)));
                });
            });
        });

        // Canvas
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if self
                    .canvas_view
                    .ui(ui, &mut self.state.playbook, &mut self.state.canvas)
                {
                    self.state.dirty = true;
                }
            });

        self.show_file_dialog(ctx);
        self.show_unsaved_warning_dialog(ctx);
    }

    fn file_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            if ui.button("New Playbook").clicked() {
                self.guarded(|editor| editor.state.new_playbook());
                ui.close_menu();
            }
            if ui.button("Open Playbook...").clicked() {
                self.file_dialog_mode = FileDialogMode::Open;
                self.file_dialog_path = String::new();
                ui.close_menu();
            }

            let has_recent = !self.state.recent_playbooks.is_empty();
            ui.add_enabled_ui(has_recent, |ui| {
                ui.menu_button("Open Recent", |ui| {
                    let recent: Vec<_> = self.state.recent_playbooks.iter().cloned().collect();
                    for path in recent {
                        let display_name = path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("Unknown");
                        let full_path = path.to_string_lossy();

                        if ui
                            .button(display_name)
                            .on_hover_text(full_path.as_ref())
                            .clicked()
                        {
                            let path = path.clone();
                            self.guarded(move |editor| {
                                if let Err(e) = editor.state.load_playbook(&path) {
                                    tracing::error!("Failed to load recent playbook: {e}");
                                }
                            });
                            ui.close_menu();
                        }
                    }

                    ui.separator();
                    if ui.button("Clear Recent").clicked() {
                        self.state.clear_recent_playbooks();
                        ui.close_menu();
                    }
                });
            });

            ui.separator();

            if ui.button("Save").clicked() {
                if self.state.playbook_path.is_some() {
                    if let Err(e) = self.state.save_playbook() {
                        tracing::error!("Failed to save playbook: {e}");
                    }
                } else {
                    self.file_dialog_mode = FileDialogMode::SaveAs;
                    self.file_dialog_path = "playbook.ron".to_string();
                }
                ui.close_menu();
            }
            if ui.button("Save As...").clicked() {
                self.file_dialog_mode = FileDialogMode::SaveAs;
                self.file_dialog_path = "playbook.ron".to_string();
                ui.close_menu();
            }
            if ui.button("Export JSON...").clicked() {
                self.file_dialog_mode = FileDialogMode::ExportJson;
                self.file_dialog_path = "playbook.json".to_string();
                ui.close_menu();
            }

            ui.separator();

            if ui.button("Exit").clicked() {
                self.guarded(|editor| editor.request_exit = true);
                ui.close_menu();
            }
        });
    }

    fn insert_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("Insert", |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.template_search)
                    .hint_text("Search nodes...")
                    .desired_width(180.0),
            );
            ui.separator();

            let needle = self.template_search.to_lowercase();
            let matches: Vec<_> = self
                .state
                .registry
                .templates()
                .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
                .map(|t| (t.id.clone(), t.title.clone()))
                .collect();

            if matches.is_empty() {
                ui.label("No matching nodes");
            }
            for (id, title) in matches {
                if ui.button(title).clicked() {
                    if self.state.add_node_from_template(&id).is_none() {
                        tracing::warn!("Unknown node template {id}");
                    }
                    ui.close_menu();
                }
            }
        });
    }

    /// Run an action now, or park it behind the unsaved-changes dialog
    fn guarded(&mut self, action: impl FnOnce(&mut EditorUi) + Send + Sync + 'static) {
        if self.state.has_unsaved_changes() {
            self.show_unsaved_warning = true;
            self.pending_action = Some(Box::new(action));
        } else {
            action(self);
        }
    }

    fn show_file_dialog(&mut self, ctx: &egui::Context) {
        if self.file_dialog_mode == FileDialogMode::None {
            return;
        }

        let title = match self.file_dialog_mode {
            FileDialogMode::Open => "Open Playbook",
            FileDialogMode::SaveAs => "Save Playbook As",
            FileDialogMode::ExportJson => "Export Playbook JSON",
            FileDialogMode::None => return,
        };

        let mut should_close = false;

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Path:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.file_dialog_path)
                            .desired_width(300.0),
                    );
                });

                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        should_close = true;
                    }

                    let action_text = match self.file_dialog_mode {
                        FileDialogMode::Open => "Open",
                        FileDialogMode::SaveAs => "Save",
                        FileDialogMode::ExportJson => "Export",
                        FileDialogMode::None => "OK",
                    };

                    if ui.button(action_text).clicked() {
                        let path = std::path::PathBuf::from(&self.file_dialog_path);
                        match self.file_dialog_mode {
                            FileDialogMode::Open => {
                                if let Err(e) = self.state.load_playbook(&path) {
                                    tracing::error!("Failed to load playbook: {e}");
                                }
                            }
                            FileDialogMode::SaveAs => {
                                if let Err(e) = self.state.save_playbook_to_path(&path) {
                                    tracing::error!("Failed to save playbook: {e}");
                                }
                            }
                            FileDialogMode::ExportJson => {
                                if let Err(e) = self.state.export_playbook_json(&path) {
                                    tracing::error!("Failed to export playbook: {e}");
                                }
                            }
                            FileDialogMode::None => {}
                        }
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.file_dialog_mode = FileDialogMode::None;
        }
    }

    fn show_unsaved_warning_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_unsaved_warning {
            return;
        }

        let mut should_close = false;
        let mut proceed = false;

        egui::Window::new("Unsaved Changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("The playbook has unsaved changes. Do you want to continue?");
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        should_close = true;
                    }
                    if ui.button("Don't Save").clicked() {
                        proceed = true;
                        should_close = true;
                    }
                    if ui.button("Save").clicked() {
                        if self.state.playbook_path.is_some() {
                            if let Err(e) = self.state.save_playbook() {
                                tracing::error!("Failed to save: {e}");
                            } else {
                                proceed = true;
                            }
                        } else {
                            // Need the save-as dialog first
                            self.file_dialog_mode = FileDialogMode::SaveAs;
                            self.file_dialog_path = "playbook.ron".to_string();
                        }
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.show_unsaved_warning = false;
            if proceed {
                if let Some(action) = self.pending_action.take() {
                    action(self);
                }
            } else {
                self.pending_action = None;
            }
        }
    }
}

/// Running state of the editor
struct EditorRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    editor: EditorUi,
}

/// Main editor application
pub struct PlumeApp {
    running: Option<EditorRunning>,
}

impl PlumeApp {
    /// Create a new editor application
    pub fn new() -> Self {
        Self { running: None }
    }

    /// Run the editor application until the window closes
    pub fn run() -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = PlumeApp::new();
        event_loop.run_app(&mut app)?;

        Ok(())
    }
}

impl Default for PlumeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for PlumeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating editor window...");

        let window_attrs = Window::default_attributes()
            .with_title("Plume Playbook Editor")
            .with_inner_size(winit::dpi::LogicalSize::new(1440, 860))
            .with_min_inner_size(winit::dpi::LogicalSize::new(800, 500));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        tracing::info!("Initializing graphics...");

        let graphics = GraphicsState::new(window.clone());

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());

        let editor = EditorUi::new();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024), // max texture side
        );

        tracing::info!("Editor initialized, window size: {:?}", window.inner_size());

        self.running = Some(EditorRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            editor,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                if running.editor.state.has_unsaved_changes() {
                    running.editor.show_unsaved_warning = true;
                    running.editor.request_exit = false;
                    running.editor.pending_action = Some(Box::new(|editor| {
                        editor.request_exit = true;
                    }));
                } else {
                    tracing::info!("Close requested, exiting...");
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {new_size:?}");
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running
                    .egui_ctx
                    .run(raw_input, |ctx| running.editor.update(ctx));

                if running.editor.request_exit {
                    event_loop.exit();
                    return;
                }

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                match running
                    .graphics
                    .render(&running.egui_ctx, full_output, &running.window)
                {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
