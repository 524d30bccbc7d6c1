use std::collections::BTreeMap;

use crate::chart::ElementKey;
use crate::models::TrackPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipStyle {
    Point,
    StartMarker,
}

/// Box geometry relative to the tooltip origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipMetrics {
    pub box_x: f64,
    pub box_y: f64,
    pub box_width: f64,
    pub box_height: f64,
    pub corner_rx: f64,
    pub corner_ry: f64,
    pub text_x: f64,
    pub first_line_y: f64,
    pub line_height: f64,
    pub font_size: f64,
    pub bold: bool,
    pub border: &'static str,
}

impl TooltipStyle {
    pub fn metrics(self) -> TooltipMetrics {
        match self {
            TooltipStyle::Point => TooltipMetrics {
                box_x: 5.0,
                box_y: -35.0,
                box_width: 180.0,
                box_height: 80.0,
                corner_rx: 10.0,
                corner_ry: 4.0,
                text_x: 10.0,
                first_line_y: -20.0,
                line_height: 15.0,
                font_size: 12.0,
                bold: false,
                border: "#ccc",
            },
            TooltipStyle::StartMarker => TooltipMetrics {
                box_x: 10.0,
                box_y: -45.0,
                box_width: 200.0,
                box_height: 100.0,
                corner_rx: 6.0,
                corner_ry: 6.0,
                text_x: 15.0,
                first_line_y: -25.0,
                line_height: 20.0,
                font_size: 14.0,
                bold: true,
                border: "#333",
            },
        }
    }

    fn offset(self) -> (f64, f64) {
        match self {
            TooltipStyle::Point => (10.0, -10.0),
            TooltipStyle::StartMarker => (15.0, -15.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Chart-local pixel position the box is drawn relative to.
    pub origin: (f64, f64),
    pub lines: Vec<String>,
    pub style: TooltipStyle,
}

impl Tooltip {
    pub fn new(point: &TrackPoint, pixel: (f64, f64), style: TooltipStyle) -> Self {
        let (dx, dy) = style.offset();
        Tooltip {
            origin: (pixel.0 + dx, pixel.1 + dy),
            lines: tooltip_lines(point),
            style,
        }
    }
}

pub fn tooltip_lines(point: &TrackPoint) -> Vec<String> {
    let time = point
        .display_time()
        .unwrap_or_else(|| "no time info".to_string());
    let speed = match point.speed {
        Some(s) => format!("Speed: {s} kn"),
        None => "no speed info".to_string(),
    };
    vec![
        format!("Longitude: {:.6}", point.x),
        format!("Latitude: {:.6}", point.y),
        format!("Time: {time}"),
        speed,
    ]
}

/// Chart-scoped record of the tooltips currently shown, keyed by the element
/// that owns them. Holds at most one tooltip per element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipTable {
    active: BTreeMap<ElementKey, Tooltip>,
}

impl TooltipTable {
    /// Returns false when the element already has a tooltip.
    pub fn hover_in(&mut self, key: ElementKey, tooltip: Tooltip) -> bool {
        match self.active.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(tooltip);
                true
            }
        }
    }

    pub fn hover_out(&mut self, key: &ElementKey) -> Option<Tooltip> {
        self.active.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&ElementKey) -> bool) {
        self.active.retain(|key, _| keep(key));
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn tooltips(&self) -> impl Iterator<Item = &Tooltip> {
        self.active.values()
    }
}
