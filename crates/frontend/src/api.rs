use std::future::Future;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use trackview_shared::models::TrackDocument;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("No window")?;
    window
        .location()
        .origin()
        .map_err(|_| "Page origin unavailable".to_string())
}

fn api_url() -> Result<String, String> {
    Ok(format!("{}/graphql", origin()?))
}

/// URL of a track file, with the name encoded as one path segment.
pub fn track_url(origin: &str, file_name: &str) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(origin).map_err(|e| e.to_string())?;
    url.path_segments_mut()
        .map_err(|_| format!("Cannot build track URL from {origin}"))?
        .pop_if_empty()
        .push("tracks")
        .push(file_name);
    Ok(url)
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if !errors.is_empty() {
            return Err(errors[0].message.clone());
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackFilesResponse {
    pub track_files: Option<Vec<String>>,
}

/// Configured track file names; `None` when the server has no tracks
/// directory.
pub async fn fetch_track_files() -> Result<Option<Vec<String>>, String> {
    let resp: TrackFilesResponse = query("query { trackFiles }", None).await?;
    Ok(resp.track_files)
}

pub async fn fetch_track_text(file_name: String) -> Result<String, String> {
    let url = track_url(&origin()?, &file_name)?;
    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;
    resp.text().await.map_err(|e| e.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub file_name: String,
    pub document: TrackDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    ConfigMissing,
    NoFiles,
    Failed(String),
    Loaded(Vec<LoadedTrack>),
}

/// Fetch and parse every file concurrently. Any failure fails the whole
/// batch with one message naming the file; results keep the input order.
pub async fn load_documents<F, Fut>(names: &[String], fetch: F) -> Result<Vec<LoadedTrack>, String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, String>>,
{
    let loads = names.iter().map(|name| {
        let text = fetch(name.clone());
        let file_name = name.clone();
        async move {
            let text = text.await.map_err(|e| format!("{file_name}: {e}"))?;
            let document =
                TrackDocument::from_json(&text).map_err(|e| format!("{file_name}: {e}"))?;
            Ok::<_, String>(LoadedTrack {
                file_name,
                document,
            })
        }
    });
    try_join_all(loads)
        .await
        .map_err(|e| format!("Failed to load track data: {e}"))
}

pub async fn load_tracks() -> LoadState {
    let files = match fetch_track_files().await {
        Ok(files) => files,
        Err(e) => return LoadState::Failed(format!("Failed to load track list: {e}")),
    };
    let Some(files) = files else {
        return LoadState::ConfigMissing;
    };
    if files.is_empty() {
        return LoadState::NoFiles;
    }
    match load_documents(&files, fetch_track_text).await {
        Ok(tracks) => LoadState::Loaded(tracks),
        Err(e) => LoadState::Failed(e),
    }
}
