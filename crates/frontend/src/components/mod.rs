pub mod chart_view;
pub mod info_panel;
pub mod toggle_panel;
