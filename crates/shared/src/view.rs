/// Allowed zoom scale factors.
pub const SCALE_MIN: f64 = 0.2;
pub const SCALE_MAX: f64 = 10.0;

/// Pan/zoom state of one chart: `screen = local * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        ZoomTransform::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn invert(&self, screen: (f64, f64)) -> (f64, f64) {
        ((screen.0 - self.x) / self.k, (screen.1 - self.y) / self.k)
    }

    /// Rescale by `factor` keeping the local point under `cursor` fixed.
    /// Returns None when the clamped scale does not change.
    pub fn zoom_at(&self, cursor: (f64, f64), factor: f64) -> Option<ZoomTransform> {
        self.zoom_to(cursor, self.k * factor)
    }

    pub fn zoom_to(&self, cursor: (f64, f64), scale: f64) -> Option<ZoomTransform> {
        let k = scale.clamp(SCALE_MIN, SCALE_MAX);
        if (k - self.k).abs() < 1e-9 {
            return None;
        }
        let (lx, ly) = self.invert(cursor);
        Some(ZoomTransform {
            x: cursor.0 - lx * k,
            y: cursor.1 - ly * k,
            k,
        })
    }

    pub fn translated(&self, dx: f64, dy: f64) -> ZoomTransform {
        ZoomTransform {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }

    /// The part of the chart's local space currently on screen.
    pub fn viewport(&self, width: f64, height: f64) -> Viewport {
        Viewport {
            origin_x: -self.x / self.k,
            origin_y: -self.y / self.k,
            width: width / self.k,
            height: height / self.k,
        }
    }

    pub fn css(&self) -> String {
        format!(
            "transform: translate({}px, {}px) scale({}); transform-origin: 0 0;",
            self.x, self.y, self.k
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Inclusive on every edge.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.origin_x
            && x <= self.origin_x + self.width
            && y >= self.origin_y
            && y <= self.origin_y + self.height
    }
}
