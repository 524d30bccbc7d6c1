pub mod chart;
pub mod error;
pub mod info;
pub mod labels;
pub mod models;
pub mod scale;
pub mod tooltip;
pub mod view;

pub use error::TrackError;
