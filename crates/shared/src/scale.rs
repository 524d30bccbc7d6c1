/// Chart geometry and the data → pixel mapping.
///
/// Longitude is padded generously so a chart can be dragged far east or west;
/// latitude only gets enough padding to keep points off the plot edge.
pub const CHART_WIDTH: f64 = 1400.0;
pub const CHART_HEIGHT: f64 = 600.0;

pub const DEFAULT_HORIZONTAL_EXTENT_FACTOR: f64 = 5.0;
pub const VERTICAL_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const DEFAULT_MARGINS: Margins = Margins {
    top: 20.0,
    right: 20.0,
    bottom: 50.0,
    left: 50.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    /// 1.0 keeps the data range as is, 2.0 doubles it, and so on.
    pub horizontal_extent_factor: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        ChartLayout {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            margins: DEFAULT_MARGINS,
            horizontal_extent_factor: DEFAULT_HORIZONTAL_EXTENT_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// None when there are no points.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Bounds> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Bounds {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    max_x: b.max_x.max(x),
                    min_y: b.min_y.min(y),
                    max_y: b.max_y.max(y),
                },
            })
        })
    }
}

/// Extend `[min, max]` so its width becomes `(max - min) * factor`, centred
/// on the original range.
pub fn extend_horizontal(min: f64, max: f64, factor: f64) -> (f64, f64) {
    let pad = (max - min) * (factor - 1.0) / 2.0;
    (min - pad, max + pad)
}

pub fn pad_vertical(min: f64, max: f64) -> (f64, f64) {
    let pad = (max - min) * VERTICAL_PADDING;
    (min - pad, max + pad)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    /// A degenerate domain maps everything to the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl ChartScales {
    pub fn fit(bounds: &Bounds, layout: &ChartLayout) -> Self {
        let m = layout.margins;
        let x_domain = extend_horizontal(bounds.min_x, bounds.max_x, layout.horizontal_extent_factor);
        let y_domain = pad_vertical(bounds.min_y, bounds.max_y);
        ChartScales {
            x: LinearScale::new(x_domain, (m.left, layout.width - m.right)),
            // Inverted: larger latitude is higher on screen.
            y: LinearScale::new(y_domain, (layout.height - m.bottom, m.top)),
        }
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (self.x.map(lon), self.y.map(lat))
    }
}
