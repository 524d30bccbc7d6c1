use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::TrackError;
use crate::scale::Bounds;

/// Format used for raw timestamps, close to what a zh-CN browser prints for
/// `Date.toLocaleString()`.
pub const LOCALE_DATETIME_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Full,
    Sub,
}

/// A point exactly as the track generator writes it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTrackPoint {
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(rename = "lastTm", default)]
    pub last_tm: Option<i64>,
    #[serde(default)]
    pub lastdt: Option<String>,
    #[serde(default)]
    pub course: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// The generator stores coordinates as strings; older files use numbers.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    let value = match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(v) => v,
        Coordinate::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate {s:?}")))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("coordinate is not finite"));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    pub last_tm: Option<i64>,
    pub lastdt: Option<String>,
    pub course: Option<f64>,
    pub speed: Option<f64>,
    pub kind: TrackKind,
}

impl TrackPoint {
    pub fn from_raw(raw: &RawTrackPoint, kind: TrackKind) -> Self {
        TrackPoint {
            x: raw.longitude,
            y: raw.latitude,
            last_tm: raw.last_tm.filter(|&t| t != 0),
            lastdt: raw.lastdt.clone().filter(|s| !s.is_empty()),
            course: raw.course,
            speed: raw.speed,
            kind,
        }
    }

    /// Text for the time label: the time part of `lastdt` when it has one,
    /// the whole `lastdt` otherwise, then the formatted `lastTm`, then nothing.
    pub fn time_label(&self) -> String {
        if let Some(dt) = &self.lastdt {
            return match dt.split_once(' ') {
                Some((_, rest)) => match rest.split(' ').next() {
                    Some(time) if !time.is_empty() => time.to_string(),
                    _ => dt.clone(),
                },
                None => dt.clone(),
            };
        }
        self.last_tm.and_then(format_timestamp).unwrap_or_default()
    }

    /// Full time text for tooltips.
    pub fn display_time(&self) -> Option<String> {
        self.lastdt
            .clone()
            .or_else(|| self.last_tm.and_then(format_timestamp))
    }
}

/// Format an epoch-milliseconds timestamp in the viewer's local time zone.
pub fn format_timestamp(millis: i64) -> Option<String> {
    format_timestamp_in(millis, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp_millis(millis)?;
    Some(
        utc.with_timezone(tz)
            .format(LOCALE_DATETIME_FORMAT)
            .to_string(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub id: String,
    pub path: Vec<TrackPoint>,
    pub kind: TrackKind,
    /// Slot shared by every element drawn for this trajectory. Full
    /// trajectories come first, so `index < full_count` means "original".
    pub index: usize,
}

impl Trajectory {
    /// The generator writes a trajectory's start location as its *last*
    /// entry. This is the only place that convention is applied.
    pub fn start_point(&self) -> Option<&TrackPoint> {
        self.path.last()
    }
}

/// Free-form description of the targets a track file was generated for.
/// Values are strings or numbers depending on the generator version.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetInfo {
    pub case_num: Option<Value>,
    pub direction: Option<Value>,
    pub id: Option<Value>,
    pub id1_starttime: Option<Value>,
    pub id1_endtime: Option<Value>,
    pub gap_range: Option<Value>,
    pub id2: Option<Value>,
    pub id2_starttime: Option<Value>,
    pub id2_endtime: Option<Value>,
}

/// `[fullTrajectories, subTrajectories, targetInfos]`, any of which may be
/// missing or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDocument {
    pub full: Vec<Vec<RawTrackPoint>>,
    pub sub: Vec<Vec<RawTrackPoint>>,
    pub targets: Vec<TargetInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub full_trajectories: usize,
    pub sub_trajectories: usize,
    pub points: usize,
    pub targets: usize,
    pub bounds: Option<Bounds>,
}

impl TrackDocument {
    pub fn from_json(text: &str) -> Result<Self, TrackError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, TrackError> {
        let Value::Array(sections) = value else {
            return Err(TrackError::NotAnArray);
        };
        let mut sections = sections.into_iter();
        Ok(TrackDocument {
            full: section(sections.next(), "full trajectory")?,
            sub: section(sections.next(), "sub trajectory")?,
            targets: section(sections.next(), "target info")?,
        })
    }

    pub fn full_count(&self) -> usize {
        self.full.len()
    }

    pub fn point_count(&self) -> usize {
        self.full.iter().chain(&self.sub).map(Vec::len).sum()
    }

    /// Project the raw lists into trajectories with stable indices.
    pub fn trajectories(&self) -> Vec<Trajectory> {
        let full_count = self.full.len();
        let full = self.full.iter().enumerate().map(|(i, raw)| Trajectory {
            id: format!("full-{}", i + 1),
            path: raw
                .iter()
                .map(|p| TrackPoint::from_raw(p, TrackKind::Full))
                .collect(),
            kind: TrackKind::Full,
            index: i,
        });
        let sub = self.sub.iter().enumerate().map(|(i, raw)| Trajectory {
            id: format!("sub-{}", i + 1),
            path: raw
                .iter()
                .map(|p| TrackPoint::from_raw(p, TrackKind::Sub))
                .collect(),
            kind: TrackKind::Sub,
            index: full_count + i,
        });
        full.chain(sub).collect()
    }

    pub fn summary(&self) -> DocumentSummary {
        let points = self
            .full
            .iter()
            .chain(&self.sub)
            .flatten()
            .map(|p| (p.longitude, p.latitude));
        DocumentSummary {
            full_trajectories: self.full.len(),
            sub_trajectories: self.sub.len(),
            points: self.point_count(),
            targets: self.targets.len(),
            bounds: Bounds::from_points(points),
        }
    }
}

fn section<T: DeserializeOwned>(
    value: Option<Value>,
    section: &'static str,
) -> Result<Vec<T>, TrackError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v).map_err(|source| TrackError::Section { section, source }),
    }
}
