//! GUI module - User interface components

mod app;
mod control_panel;
mod report_viewer;

pub use app::PcaApp;
pub use control_panel::{ControlPanel, ControlPanelAction, UserSettings};
pub use report_viewer::ReportViewer;
