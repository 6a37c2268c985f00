// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plume Playbook Editor - visual builder for marketing automation playbooks.
//!
//! A desktop canvas editor featuring:
//! - Draggable workflow node cards
//! - Two-click connect gesture with a live preview line
//! - A node template catalogue with search
//! - Playbook save/load (RON) and JSON export
//!
//! ## Architecture
//!
//! The canvas model and interaction machine live in `plume_editor_graph`;
//! this crate hosts the window, the menus, and file handling. It uses egui
//! over a wgpu surface driven by winit.

mod app;
mod state;

use app::PlumeApp;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("plume_editor_app=debug".parse().unwrap())
        .add_directive("plume_editor_graph=debug".parse().unwrap())
        .add_directive("wgpu=warn".parse().unwrap())
        .add_directive("naga=warn".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Plume Playbook Editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = PlumeApp::run() {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
