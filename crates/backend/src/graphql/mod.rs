use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, SimpleObject};
use trackview_shared::info::info_lines;

use crate::catalog::{TrackCatalog, TrackFile};

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlTrackFile {
    pub file_name: String,
    pub size: u64,
    pub modified: Option<String>,
}

impl From<TrackFile> for GqlTrackFile {
    fn from(f: TrackFile) -> Self {
        GqlTrackFile {
            file_name: f.file_name,
            size: f.size,
            modified: f.modified,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlBounds {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

#[derive(SimpleObject)]
pub struct GqlTrackSummary {
    pub file_name: String,
    pub full_trajectories: u64,
    pub sub_trajectories: u64,
    pub points: u64,
    pub targets: u64,
    pub bounds: Option<GqlBounds>,
    /// Info block lines, one list per target.
    pub info: Vec<Vec<String>>,
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Track file names in display order; null when no tracks directory is
    /// configured.
    async fn track_files(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<String>>> {
        let catalog = ctx.data::<Arc<TrackCatalog>>()?;
        catalog.file_names().await.map_err(async_graphql::Error::new)
    }

    async fn tracks(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<GqlTrackFile>>> {
        let catalog = ctx.data::<Arc<TrackCatalog>>()?;
        let files = catalog.list().await.map_err(async_graphql::Error::new)?;
        Ok(files.map(|files| files.into_iter().map(GqlTrackFile::from).collect()))
    }

    async fn track_summary(
        &self,
        ctx: &Context<'_>,
        file_name: String,
    ) -> async_graphql::Result<GqlTrackSummary> {
        let catalog = ctx.data::<Arc<TrackCatalog>>()?;
        let doc = catalog.read_document(&file_name).await.map_err(|e| {
            tracing::warn!(file = %file_name, error = %e, "Track summary failed");
            async_graphql::Error::new(e)
        })?;
        let summary = doc.summary();

        Ok(GqlTrackSummary {
            file_name,
            full_trajectories: summary.full_trajectories as u64,
            sub_trajectories: summary.sub_trajectories as u64,
            points: summary.points as u64,
            targets: summary.targets as u64,
            bounds: summary.bounds.map(|b| GqlBounds {
                min_longitude: b.min_x,
                max_longitude: b.max_x,
                min_latitude: b.min_y,
                max_latitude: b.max_y,
            }),
            info: doc.targets.iter().map(info_lines).collect(),
        })
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(catalog: Arc<TrackCatalog>) -> Schema {
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(catalog)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r#"[
        [[{"longitude":"120","latitude":"30"},{"longitude":"121","latitude":"31"}]],
        [[{"longitude":120.5,"latitude":30.5,"speed":8}]],
        [{"case_num":7,"id":"413000001","gap_range":20}]
    ]"#;

    fn schema_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Schema) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let schema = build_schema(Arc::new(TrackCatalog::new(dir.path())));
        (dir, schema)
    }

    async fn run(schema: &Schema, query: &str) -> async_graphql::Response {
        schema.execute(query).await
    }

    #[tokio::test]
    async fn test_track_files_in_order() {
        let (_dir, schema) = schema_with(&[("b.json", DOC), ("a.json", DOC)]);
        let resp = run(&schema, "{ trackFiles }").await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "trackFiles": ["a.json", "b.json"] })
        );
    }

    #[tokio::test]
    async fn test_track_files_null_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let schema = build_schema(Arc::new(TrackCatalog::new(dir.path().join("missing"))));
        let resp = run(&schema, "{ trackFiles }").await;
        assert!(resp.errors.is_empty());
        assert_eq!(resp.data.into_json().unwrap(), json!({ "trackFiles": null }));
    }

    #[tokio::test]
    async fn test_tracks_lists_sizes() {
        let (_dir, schema) = schema_with(&[("a.json", DOC)]);
        let resp = run(&schema, "{ tracks { fileName size } }").await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "tracks": [{ "fileName": "a.json", "size": DOC.len() }] })
        );
    }

    #[tokio::test]
    async fn test_track_summary() {
        let (_dir, schema) = schema_with(&[("a.json", DOC)]);
        let resp = run(
            &schema,
            r#"{ trackSummary(fileName: "a.json") {
                fullTrajectories subTrajectories points targets
                bounds { minLongitude maxLatitude }
                info
            } }"#,
        )
        .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "trackSummary": {
                "fullTrajectories": 1,
                "subTrajectories": 1,
                "points": 3,
                "targets": 1,
                "bounds": { "minLongitude": 120.0, "maxLatitude": 31.0 },
                "info": [["Case: 7", "ID1: 413000001", "Gap: 20 min"]]
            }})
        );
    }

    #[tokio::test]
    async fn test_track_summary_rejects_path_escape() {
        let (_dir, schema) = schema_with(&[("a.json", DOC)]);
        let resp = run(&schema, r#"{ trackSummary(fileName: "../a.json") { points } }"#).await;
        assert_eq!(resp.errors.len(), 1);
        assert!(resp.errors[0].message.contains("Invalid track file name"));
    }
}
