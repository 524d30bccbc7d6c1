use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("track document must be a JSON array")]
    NotAnArray,
    #[error("invalid {section} list: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
