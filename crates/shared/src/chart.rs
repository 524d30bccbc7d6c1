use crate::info::info_lines;
use crate::labels::{trajectory_displayed, LabelKind, LabelToggles, VisibilityContext};
use crate::models::{TargetInfo, TrackDocument, TrackKind, Trajectory};
use crate::scale::{Bounds, ChartLayout, ChartScales};
use crate::tooltip::{Tooltip, TooltipStyle, TooltipTable};
use crate::view::ZoomTransform;

/// Qualitative ten-colour palette (d3 category10).
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const FULL_POINT_RADIUS: f64 = 0.5;
pub const SUB_POINT_RADIUS: f64 = 4.0;
pub const START_MARKER_SIZE: f64 = 20.0;
pub const START_MARKER_FILL: &str = "green";

pub fn trajectory_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Identity of a hoverable element within one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKey {
    Point { trajectory: usize, point: usize },
    StartMarker { trajectory: usize },
}

impl ElementKey {
    pub fn trajectory(&self) -> usize {
        match *self {
            ElementKey::Point { trajectory, .. } | ElementKey::StartMarker { trajectory } => trajectory,
        }
    }
}

/// A trajectory together with its pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTrajectory {
    pub trajectory: Trajectory,
    pub color: &'static str,
    pub pixels: Vec<(f64, f64)>,
    pub start: Option<(f64, f64)>,
}

impl ChartTrajectory {
    pub fn index(&self) -> usize {
        self.trajectory.index
    }

    pub fn dashed(&self) -> bool {
        self.trajectory.kind == TrackKind::Full
    }

    pub fn point_radius(&self) -> f64 {
        match self.trajectory.kind {
            TrackKind::Full => FULL_POINT_RADIUS,
            TrackKind::Sub => SUB_POINT_RADIUS,
        }
    }

    /// SVG path data through every point, in path order.
    pub fn line_path(&self) -> String {
        let mut d = String::with_capacity(self.pixels.len() * 24);
        for (i, (x, y)) in self.pixels.iter().enumerate() {
            d.push(if i == 0 { 'M' } else { 'L' });
            d.push_str(&format!("{x},{y}"));
        }
        d
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub kind: LabelKind,
    pub trajectory_index: usize,
    pub point_index: usize,
    pub anchor: (f64, f64),
    pub text: String,
    pub color: &'static str,
}

/// Everything needed to draw one track file. Built once per chart; zooming
/// and toggling only change which parts are shown.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub file_name: String,
    pub layout: ChartLayout,
    pub bounds: Bounds,
    pub scales: ChartScales,
    pub trajectories: Vec<ChartTrajectory>,
    pub full_count: usize,
    pub targets: Vec<TargetInfo>,
    pub labels: Vec<Label>,
}

impl ChartModel {
    /// None when the document has no points at all.
    pub fn build(file_name: &str, doc: &TrackDocument, layout: ChartLayout) -> Option<Self> {
        let trajectories = doc.trajectories();
        let bounds = Bounds::from_points(
            trajectories
                .iter()
                .flat_map(|t| t.path.iter().map(|p| (p.x, p.y))),
        )?;
        let scales = ChartScales::fit(&bounds, &layout);

        let trajectories: Vec<ChartTrajectory> = trajectories
            .into_iter()
            .map(|trajectory| {
                let pixels = trajectory
                    .path
                    .iter()
                    .map(|p| scales.project(p.x, p.y))
                    .collect();
                let start = trajectory
                    .start_point()
                    .map(|p| scales.project(p.x, p.y));
                ChartTrajectory {
                    color: trajectory_color(trajectory.index),
                    trajectory,
                    pixels,
                    start,
                }
            })
            .collect();

        let mut labels = Vec::new();
        for kind in LabelKind::ALL {
            for t in &trajectories {
                for (i, (point, &(px, py))) in t.trajectory.path.iter().zip(&t.pixels).enumerate() {
                    labels.push(Label {
                        kind,
                        trajectory_index: t.index(),
                        point_index: i,
                        anchor: kind.anchor(px, py),
                        text: kind.text(point),
                        color: t.color,
                    });
                }
            }
        }

        Some(ChartModel {
            file_name: file_name.to_string(),
            layout,
            bounds,
            scales,
            trajectories,
            full_count: doc.full_count(),
            targets: doc.targets.clone(),
            labels,
        })
    }

    pub fn title(&self) -> String {
        format!("Trajectory — {}", self.file_name)
    }

    pub fn visibility(&self, transform: ZoomTransform, toggles: LabelToggles) -> VisibilityContext {
        VisibilityContext {
            transform,
            width: self.layout.width,
            height: self.layout.height,
            toggles,
            full_count: self.full_count,
        }
    }

    pub fn visible_labels(&self, transform: ZoomTransform, toggles: LabelToggles) -> Vec<&Label> {
        let ctx = self.visibility(transform, toggles);
        self.labels
            .iter()
            .filter(|l| ctx.label_visible(l.kind, l.anchor, l.trajectory_index))
            .collect()
    }

    /// Whether the line, points and start marker of a trajectory are shown.
    pub fn displayed(&self, trajectory_index: usize, show_original: bool) -> bool {
        trajectory_displayed(trajectory_index, self.full_count, show_original)
    }

    /// Topmost displayed element under a chart-local position. `tolerance`
    /// widens point hit areas so tiny points stay hoverable.
    pub fn hit_test(&self, local: (f64, f64), tolerance: f64, show_original: bool) -> Option<ElementKey> {
        let (x, y) = local;
        for t in self.trajectories.iter().rev() {
            if !self.displayed(t.index(), show_original) {
                continue;
            }
            if let Some((sx, sy)) = t.start {
                let half = START_MARKER_SIZE / 2.0;
                if (x - sx).abs() <= half && (y - sy).abs() <= half {
                    return Some(ElementKey::StartMarker {
                        trajectory: t.index(),
                    });
                }
            }
            let reach = t.point_radius() + tolerance;
            let nearest = t
                .pixels
                .iter()
                .enumerate()
                .map(|(i, &(px, py))| (i, ((px - x).powi(2) + (py - y).powi(2)).sqrt()))
                .filter(|&(_, d)| d <= reach)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((i, _)) = nearest {
                return Some(ElementKey::Point {
                    trajectory: t.index(),
                    point: i,
                });
            }
        }
        None
    }

    pub fn tooltip(&self, key: ElementKey) -> Option<Tooltip> {
        match key {
            ElementKey::Point { trajectory, point } => {
                let t = self.trajectories.get(trajectory)?;
                let p = t.trajectory.path.get(point)?;
                let pixel = *t.pixels.get(point)?;
                Some(Tooltip::new(p, pixel, TooltipStyle::Point))
            }
            ElementKey::StartMarker { trajectory } => {
                let t = self.trajectories.get(trajectory)?;
                let p = t.trajectory.start_point()?;
                Some(Tooltip::new(p, t.start?, TooltipStyle::StartMarker))
            }
        }
    }

    /// Drop tooltips whose trajectory is no longer drawn.
    pub fn prune_hidden(&self, table: &mut TooltipTable, show_original: bool) {
        table.retain(|key| self.displayed(key.trajectory(), show_original));
    }

    pub fn info_blocks(&self) -> Vec<Vec<String>> {
        self.targets.iter().map(info_lines).collect()
    }
}
