use serde::Deserialize;
use trackview_shared::info::info_lines;
use trackview_shared::models::TrackDocument;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const USAGE: &str = "Usage: trackctl [--url http://host:port] [--file name.json]...";

// --- GraphQL response types ---

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlData {
    track_files: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

fn fetch_track_files(client: &reqwest::blocking::Client, base_url: &str) -> Result<Option<Vec<String>>, String> {
    let url = format!("{base_url}/graphql");
    eprintln!("Fetching track list from {url}...");
    let body: GraphQlResponse = client
        .post(&url)
        .json(&serde_json::json!({ "query": "{ trackFiles }" }))
        .send()
        .map_err(|e| format!("Failed to fetch track list: {e}"))?
        .json()
        .map_err(|e| format!("Failed to parse track list response: {e}"))?;

    if let Some(error) = body.errors.as_ref().and_then(|errors| errors.first()) {
        return Err(format!("Server error: {}", error.message));
    }
    Ok(body.data.and_then(|d| d.track_files))
}

fn fetch_document(client: &reqwest::blocking::Client, base_url: &str, file_name: &str) -> Result<TrackDocument, String> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| format!("Invalid --url {base_url}: {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("Invalid --url {base_url}"))?
        .pop_if_empty()
        .push("tracks")
        .push(file_name);

    eprintln!("Fetching {url}...");
    let text = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(|e| format!("{file_name}: {e}"))?;
    TrackDocument::from_json(&text).map_err(|e| format!("{file_name}: {e}"))
}

fn format_document(file_name: &str, doc: &TrackDocument) -> String {
    let summary = doc.summary();
    let mut out = String::new();
    out.push_str(&format!("=== {file_name} ===\n"));
    out.push_str(&format!(
        "  Trajectories: {} full, {} sub\n",
        summary.full_trajectories, summary.sub_trajectories
    ));
    out.push_str(&format!("  Points: {}\n", summary.points));
    match summary.bounds {
        Some(b) => out.push_str(&format!(
            "  Longitude: {:.6} .. {:.6}\n  Latitude: {:.6} .. {:.6}\n",
            b.min_x, b.max_x, b.min_y, b.max_y
        )),
        None => out.push_str("  No points to draw\n"),
    }
    for (i, target) in doc.targets.iter().enumerate() {
        out.push_str(&format!("  Target {}:\n", i + 1));
        for line in info_lines(target) {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out.push('\n');
    out
}

fn get_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().skip_while(|a| *a != flag).nth(1).cloned()
}

/// Every value given for a repeatable flag, in order.
fn get_args(args: &[String], flag: &str) -> Vec<String> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].clone())
        .collect()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        return;
    }

    let base_url = get_arg(&args, "--url").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = base_url.trim_end_matches('/').to_string();
    let client = reqwest::blocking::Client::new();

    let mut files = get_args(&args, "--file");
    if files.is_empty() {
        files = match fetch_track_files(&client, &base_url) {
            Ok(Some(files)) => files,
            Ok(None) => {
                eprintln!("The server has no track file list configured (TRACKS_DIR is missing)");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };
    }
    if files.is_empty() {
        eprintln!("No track files found");
        return;
    }

    let mut failed = false;
    for file in &files {
        match fetch_document(&client, &base_url, file) {
            Ok(doc) => print!("{}", format_document(file, &doc)),
            Err(e) => {
                eprintln!("Failed to load track data: {e}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
