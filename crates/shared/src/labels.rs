use crate::models::TrackPoint;
use crate::view::ZoomTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Time,
    Course,
    Speed,
}

impl LabelKind {
    pub const ALL: [LabelKind; 3] = [LabelKind::Time, LabelKind::Course, LabelKind::Speed];

    /// Offset of the label anchor from its point, in chart pixels.
    pub fn offset(self) -> (f64, f64) {
        match self {
            LabelKind::Time => (-10.0, -10.0),
            LabelKind::Course => (10.0, 15.0),
            LabelKind::Speed => (-10.0, 8.0),
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            LabelKind::Time => "time-label",
            LabelKind::Course => "course-label",
            LabelKind::Speed => "speed-label",
        }
    }

    pub fn text(self, point: &TrackPoint) -> String {
        match self {
            LabelKind::Time => point.time_label(),
            LabelKind::Course => point.course.map(|c| format!("{c}°")).unwrap_or_default(),
            LabelKind::Speed => point.speed.map(|s| format!("{s} kn")).unwrap_or_default(),
        }
    }

    pub fn anchor(self, px: f64, py: f64) -> (f64, f64) {
        let (dx, dy) = self.offset();
        (px + dx, py + dy)
    }
}

/// Checkbox state shared by every chart on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelToggles {
    pub show_time: bool,
    pub show_course: bool,
    pub show_speed: bool,
    pub show_original: bool,
}

impl LabelToggles {
    pub fn shows(&self, kind: LabelKind) -> bool {
        match kind {
            LabelKind::Time => self.show_time,
            LabelKind::Course => self.show_course,
            LabelKind::Speed => self.show_speed,
        }
    }

    /// Initial state from a page query string such as
    /// `?showTime=1&showOriginal=true`. Unknown keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut toggles = LabelToggles::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
            let on = matches!(value, "1" | "true" | "on" | "yes");
            match key {
                "showTime" => toggles.show_time = on,
                "showCourse" => toggles.show_course = on,
                "showSpeed" => toggles.show_speed = on,
                "showOriginal" => toggles.show_original = on,
                _ => {}
            }
        }
        toggles
    }
}

/// Whether a trajectory's line, points and start marker are displayed.
/// Sub trajectories always are; full ones follow the show-original toggle.
pub fn trajectory_displayed(index: usize, full_count: usize, show_original: bool) -> bool {
    index >= full_count || show_original
}

/// Everything the label filter needs besides the label itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityContext {
    pub transform: ZoomTransform,
    pub width: f64,
    pub height: f64,
    pub toggles: LabelToggles,
    pub full_count: usize,
}

impl VisibilityContext {
    /// A label is shown only when its kind is toggled on, its anchor is on
    /// screen, and it does not belong to a hidden original trajectory.
    pub fn label_visible(&self, kind: LabelKind, anchor: (f64, f64), trajectory_index: usize) -> bool {
        if !self.toggles.shows(kind) {
            return false;
        }
        let viewport = self.transform.viewport(self.width, self.height);
        if !viewport.contains(anchor.0, anchor.1) {
            return false;
        }
        trajectory_displayed(trajectory_index, self.full_count, self.toggles.show_original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackKind;

    fn ctx(toggles: LabelToggles) -> VisibilityContext {
        VisibilityContext {
            transform: ZoomTransform::IDENTITY,
            width: 1400.0,
            height: 600.0,
            toggles,
            full_count: 2,
        }
    }

    fn all_on() -> LabelToggles {
        LabelToggles {
            show_time: true,
            show_course: true,
            show_speed: true,
            show_original: true,
        }
    }

    #[test]
    fn test_toggled_off_kind_is_hidden() {
        let c = ctx(LabelToggles {
            show_course: true,
            ..Default::default()
        });
        assert!(!c.label_visible(LabelKind::Time, (100.0, 100.0), 5));
        assert!(c.label_visible(LabelKind::Course, (100.0, 100.0), 5));
    }

    #[test]
    fn test_label_outside_viewport_is_hidden() {
        let c = ctx(all_on());
        assert!(!c.label_visible(LabelKind::Speed, (1400.5, 100.0), 5));
        assert!(!c.label_visible(LabelKind::Speed, (-1.0, 100.0), 5));
    }

    #[test]
    fn test_label_on_viewport_edge_is_visible() {
        let c = ctx(all_on());
        assert!(c.label_visible(LabelKind::Time, (0.0, 0.0), 5));
        assert!(c.label_visible(LabelKind::Time, (1400.0, 600.0), 5));
    }

    #[test]
    fn test_original_labels_need_show_original() {
        let mut toggles = all_on();
        toggles.show_original = false;
        let c = ctx(toggles);
        assert!(!c.label_visible(LabelKind::Time, (10.0, 10.0), 0));
        assert!(!c.label_visible(LabelKind::Time, (10.0, 10.0), 1));
        assert!(c.label_visible(LabelKind::Time, (10.0, 10.0), 2));
    }

    #[test]
    fn test_viewport_follows_transform() {
        let mut c = ctx(all_on());
        c.transform = ZoomTransform {
            x: -1400.0,
            y: 0.0,
            k: 2.0,
        };
        // Visible local x range is [700, 1400].
        assert!(!c.label_visible(LabelKind::Course, (600.0, 100.0), 3));
        assert!(c.label_visible(LabelKind::Course, (700.0, 100.0), 3));
    }

    #[test]
    fn test_trajectory_displayed() {
        assert!(!trajectory_displayed(0, 2, false));
        assert!(!trajectory_displayed(1, 2, false));
        assert!(trajectory_displayed(2, 2, false));
        assert!(trajectory_displayed(0, 2, true));
        assert!(trajectory_displayed(0, 0, false));
    }

    #[test]
    fn test_anchor_offsets() {
        assert_eq!(LabelKind::Time.anchor(100.0, 100.0), (90.0, 90.0));
        assert_eq!(LabelKind::Course.anchor(100.0, 100.0), (110.0, 115.0));
        assert_eq!(LabelKind::Speed.anchor(100.0, 100.0), (90.0, 108.0));
    }

    #[test]
    fn test_label_text() {
        let p = TrackPoint {
            x: 0.0,
            y: 0.0,
            last_tm: None,
            lastdt: None,
            course: Some(271.5),
            speed: Some(12.0),
            kind: TrackKind::Sub,
        };
        assert_eq!(LabelKind::Course.text(&p), "271.5°");
        assert_eq!(LabelKind::Speed.text(&p), "12 kn");
        assert_eq!(LabelKind::Time.text(&p), "");
        let bare = TrackPoint {
            course: None,
            speed: None,
            ..p
        };
        assert_eq!(LabelKind::Course.text(&bare), "");
        assert_eq!(LabelKind::Speed.text(&bare), "");
    }

    #[test]
    fn test_toggles_from_query() {
        let t = LabelToggles::from_query("?showTime=1&showOriginal=true&other=1");
        assert!(t.show_time);
        assert!(t.show_original);
        assert!(!t.show_course);
        assert!(!t.show_speed);

        let t = LabelToggles::from_query("showSpeed&showCourse=0");
        assert!(t.show_speed);
        assert!(!t.show_course);

        assert_eq!(LabelToggles::from_query(""), LabelToggles::default());
    }
}
