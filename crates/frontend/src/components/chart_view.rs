use std::rc::Rc;

use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::logger::tracing::debug;
use dioxus::prelude::*;
use trackview_shared::chart::{ChartModel, ElementKey, START_MARKER_FILL, START_MARKER_SIZE};
use trackview_shared::labels::LabelToggles;
use trackview_shared::scale::ChartLayout;
use trackview_shared::tooltip::{Tooltip, TooltipTable};
use trackview_shared::view::ZoomTransform;

use crate::api::LoadedTrack;
use crate::components::info_panel::InfoPanel;
use crate::coords;

/// Movement below this many pixels does not pan.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch needs a larger threshold than the mouse.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

const ZOOM_STEP: f64 = 1.1;

/// Extra hover reach around points, in screen pixels.
const HOVER_TOLERANCE: f64 = 3.0;

const LABEL_FONT_SIZE: f64 = 5.0;

fn container_id(chart_index: usize) -> String {
    format!("trajectory-chart-{chart_index}")
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

// ---------------------------------------------------------------------------
// SVG builders
// ---------------------------------------------------------------------------

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Lines, points and start markers of every displayed trajectory.
fn build_geometry(svg: &mut String, model: &ChartModel, show_original: bool) {
    for t in &model.trajectories {
        let index = t.index();
        if !model.displayed(index, show_original) {
            continue;
        }
        let color = t.color;
        let dash = if t.dashed() { r#" stroke-dasharray="5,5""# } else { "" };
        svg.push_str(&format!(
            r#"<path class="trajectory-line trajectory-{index}" d="{}" fill="none" stroke="{color}" stroke-width="1"{dash}/>"#,
            t.line_path()
        ));
        let r = t.point_radius();
        for &(cx, cy) in &t.pixels {
            svg.push_str(&format!(
                r#"<circle class="track-point track-{index}" cx="{cx}" cy="{cy}" r="{r}" fill="{color}"/>"#
            ));
        }
        if let Some((sx, sy)) = t.start {
            let half = START_MARKER_SIZE / 2.0;
            let (x, y) = (sx - half, sy - half);
            svg.push_str(&format!(
                r#"<rect class="start-point start-point-{index}" x="{x}" y="{y}" width="{START_MARKER_SIZE}" height="{START_MARKER_SIZE}" fill="{START_MARKER_FILL}" stroke="{color}" stroke-width="2"/>"#
            ));
        }
    }
}

fn build_labels(svg: &mut String, model: &ChartModel, transform: ZoomTransform, toggles: LabelToggles) {
    for label in model.visible_labels(transform, toggles) {
        if label.text.is_empty() {
            continue;
        }
        let (x, y) = label.anchor;
        svg.push_str(&format!(
            r#"<text class="info-label {} {}-{}" x="{x}" y="{y}" font-size="{LABEL_FONT_SIZE}" fill="{}">{}</text>"#,
            label.kind.class_name(),
            label.kind.class_name(),
            label.trajectory_index,
            label.color,
            escape_xml(&label.text)
        ));
    }
}

fn build_tooltip(svg: &mut String, tooltip: &Tooltip) {
    let m = tooltip.style.metrics();
    let (ox, oy) = tooltip.origin;
    let weight = if m.bold { r#" font-weight="bold""# } else { "" };
    svg.push_str(&format!(
        r#"<g class="tooltip" transform="translate({ox}, {oy})"><rect x="{}" y="{}" width="{}" height="{}" fill="white" stroke="{}" stroke-width="1" rx="{}" ry="{}"/>"#,
        m.box_x, m.box_y, m.box_width, m.box_height, m.border, m.corner_rx, m.corner_ry
    ));
    for (i, line) in tooltip.lines.iter().enumerate() {
        let y = m.first_line_y + m.line_height * i as f64;
        svg.push_str(&format!(
            r##"<text x="{}" y="{y}" font-size="{}" fill="#333"{weight}>{}</text>"##,
            m.text_x,
            m.font_size,
            escape_xml(line)
        ));
    }
    svg.push_str("</g>");
}

fn build_svg(layout: &ChartLayout, layers: &[&str]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="display:block;overflow:visible;">"#,
        w = layout.width,
        h = layout.height
    );
    for layer in layers {
        svg.push_str(layer);
    }
    svg.push_str("</svg>");
    svg
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragStart {
    chart: (f64, f64),
    transform: ZoomTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchStart {
    distance: f64,
    midpoint: (f64, f64),
    transform: ZoomTransform,
}

#[component]
pub fn ChartView(track: LoadedTrack, chart_index: usize, toggles: Signal<LabelToggles>) -> Element {
    // Scales and label anchors are computed once per chart.
    let model = use_hook(|| {
        let model = ChartModel::build(&track.file_name, &track.document, ChartLayout::default());
        if model.is_none() {
            debug!(file = %track.file_name, "No points, skipping chart");
        }
        Rc::new(model)
    });

    let mut transform = use_signal(|| ZoomTransform::IDENTITY);
    let mut tooltips = use_signal(TooltipTable::default);
    let mut hovered = use_signal(|| None::<ElementKey>);

    let mut drag_start = use_signal(|| None::<DragStart>);
    let mut did_drag = use_signal(|| false);
    let mut touch_start = use_signal(|| None::<DragStart>);
    let mut touch_did_pan = use_signal(|| false);
    let mut pinch_start = use_signal(|| None::<PinchStart>);

    let geometry_svg = use_memo({
        let model = model.clone();
        move || {
            let mut svg = String::with_capacity(16384);
            if let Some(model) = model.as_ref() {
                build_geometry(&mut svg, model, toggles.read().show_original);
            }
            svg
        }
    });

    // The only work done on every transform change.
    let labels_svg = use_memo({
        let model = model.clone();
        move || {
            let mut svg = String::new();
            if let Some(model) = model.as_ref() {
                build_labels(&mut svg, model, *transform.read(), *toggles.read());
            }
            svg
        }
    });

    // Hiding originals must not leave a tooltip on a trajectory that is gone.
    let show_original = use_memo(move || toggles.read().show_original);
    use_effect({
        let model = model.clone();
        move || {
            let show = show_original();
            if let Some(model) = model.as_ref() {
                model.prune_hidden(&mut tooltips.write(), show);
                let hidden = hovered.peek().is_some_and(|key| !model.displayed(key.trajectory(), show));
                if hidden {
                    hovered.set(None);
                }
            }
        }
    });

    // Tooltips are anchored to chart pixels, so any view change drops them
    // until the pointer moves again.
    let mut clear_hover = move || {
        if !tooltips.peek().is_empty() {
            tooltips.write().clear();
        }
        hovered.set(None);
    };

    let Some(chart) = model.as_ref().as_ref() else {
        return rsx! {};
    };
    let layout = chart.layout;
    let id = container_id(chart_index);
    let title = chart.title();

    let mut tooltip_svg = String::new();
    for tooltip in tooltips.read().tooltips() {
        build_tooltip(&mut tooltip_svg, tooltip);
    }
    let svg_html = build_svg(
        &layout,
        &[
            geometry_svg.read().as_str(),
            labels_svg.read().as_str(),
            tooltip_svg.as_str(),
        ],
    );

    let transform_style = transform.read().css();
    let container_class = if drag_start.read().is_some() && *did_drag.read() {
        "chart-container dragging"
    } else {
        "chart-container"
    };
    let container_style = format!("width: {}px; height: {}px;", layout.width, layout.height);

    let hover_model = model.clone();
    let mut update_hover = move |client: (f64, f64)| {
        let Some(chart) = hover_model.as_ref().as_ref() else {
            return;
        };
        let t = *transform.read();
        let key = coords::client_to_local(client.0, client.1, &container_id(chart_index), &chart.layout, &t)
            .and_then(|local| chart.hit_test(local, HOVER_TOLERANCE / t.k, toggles.read().show_original));
        let previous = *hovered.read();
        if key == previous {
            return;
        }
        let mut table = tooltips.write();
        if let Some(old) = previous {
            table.hover_out(&old);
        }
        if let Some(new) = key {
            if let Some(tooltip) = chart.tooltip(new) {
                table.hover_in(new, tooltip);
            }
        }
        hovered.set(key);
    };

    let wheel_id = id.clone();
    let down_id = id.clone();
    let move_id = id.clone();
    let touch_start_id = id.clone();
    let touch_move_id = id.clone();

    rsx! {
        div { class: "chart-wrapper",
            div { class: "chart-panel",
                h3 { class: "chart-title", "{title}" }
                div {
                    id: "{id}",
                    class: "{container_class}",
                    style: "{container_style}",

                    onwheel: move |evt: Event<WheelData>| {
                        evt.prevent_default();
                        let delta_y = wheel_delta_y(evt.data().delta());
                        let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                        let client = evt.data().client_coordinates();
                        let Some(cursor) = coords::client_to_chart(client.x, client.y, &wheel_id, &layout) else {
                            return;
                        };
                        let zoomed = transform.read().zoom_at(cursor, factor);
                        if let Some(next) = zoomed {
                            clear_hover();
                            transform.set(next);
                        }
                    },

                    onmousedown: move |evt: Event<MouseData>| {
                        if evt.trigger_button() != Some(MouseButton::Primary) {
                            return;
                        }
                        let client = evt.client_coordinates();
                        let Some(chart) = coords::client_to_chart(client.x, client.y, &down_id, &layout) else {
                            return;
                        };
                        drag_start.set(Some(DragStart { chart, transform: *transform.read() }));
                        did_drag.set(false);
                    },

                    onmousemove: move |evt: Event<MouseData>| {
                        let client = evt.client_coordinates();
                        let start = *drag_start.read();
                        let Some(start) = start else {
                            update_hover((client.x, client.y));
                            return;
                        };
                        let Some(now) = coords::client_to_chart(client.x, client.y, &move_id, &layout) else {
                            return;
                        };
                        let dx = now.0 - start.chart.0;
                        let dy = now.1 - start.chart.1;
                        if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                            did_drag.set(true);
                            clear_hover();
                        }
                        if *did_drag.read() {
                            transform.set(start.transform.translated(dx, dy));
                        }
                    },

                    onmouseup: move |_| {
                        drag_start.set(None);
                    },

                    onmouseleave: move |_| {
                        drag_start.set(None);
                        clear_hover();
                    },

                    ondoubleclick: move |evt: Event<MouseData>| {
                        evt.prevent_default();
                        clear_hover();
                        transform.set(ZoomTransform::IDENTITY);
                    },

                    // --- Touch event handlers ---

                    ontouchstart: move |evt: Event<TouchData>| {
                        evt.prevent_default();
                        let touches = evt.data().touches();
                        if touches.len() == 1 {
                            let c = touches[0].client_coordinates();
                            let Some(chart) = coords::client_to_chart(c.x, c.y, &touch_start_id, &layout) else {
                                return;
                            };
                            touch_start.set(Some(DragStart { chart, transform: *transform.read() }));
                            touch_did_pan.set(false);
                        } else if touches.len() >= 2 {
                            let c0 = touches[0].client_coordinates();
                            let c1 = touches[1].client_coordinates();
                            let p0 = coords::client_to_chart(c0.x, c0.y, &touch_start_id, &layout);
                            let p1 = coords::client_to_chart(c1.x, c1.y, &touch_start_id, &layout);
                            let (Some(p0), Some(p1)) = (p0, p1) else {
                                return;
                            };
                            clear_hover();
                            pinch_start.set(Some(PinchStart {
                                distance: point_distance(p0, p1),
                                midpoint: ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0),
                                transform: *transform.read(),
                            }));
                            touch_start.set(None);
                        }
                    },

                    ontouchmove: move |evt: Event<TouchData>| {
                        evt.prevent_default();
                        let touches = evt.data().touches();
                        let pinch = *pinch_start.read();

                        if let (Some(pinch), true) = (pinch, touches.len() >= 2) {
                            if pinch.distance < 1.0 {
                                return;
                            }
                            let c0 = touches[0].client_coordinates();
                            let c1 = touches[1].client_coordinates();
                            let p0 = coords::client_to_chart(c0.x, c0.y, &touch_move_id, &layout);
                            let p1 = coords::client_to_chart(c1.x, c1.y, &touch_move_id, &layout);
                            let (Some(p0), Some(p1)) = (p0, p1) else {
                                return;
                            };
                            let scale = pinch.transform.k * point_distance(p0, p1) / pinch.distance;
                            if let Some(next) = pinch.transform.zoom_to(pinch.midpoint, scale) {
                                transform.set(next);
                            }
                        } else if touches.len() == 1 {
                            let start = *touch_start.read();
                            let Some(start) = start else {
                                return;
                            };
                            let c = touches[0].client_coordinates();
                            let Some(now) = coords::client_to_chart(c.x, c.y, &touch_move_id, &layout) else {
                                return;
                            };
                            if !*touch_did_pan.read() && point_distance(start.chart, now) > TOUCH_DRAG_THRESHOLD {
                                touch_did_pan.set(true);
                                clear_hover();
                            }
                            if *touch_did_pan.read() {
                                transform.set(start.transform.translated(now.0 - start.chart.0, now.1 - start.chart.1));
                            }
                        }
                    },

                    ontouchend: move |evt: Event<TouchData>| {
                        evt.prevent_default();
                        if evt.data().touches().is_empty() {
                            pinch_start.set(None);
                            touch_start.set(None);
                        }
                    },

                    ontouchcancel: move |_evt: Event<TouchData>| {
                        pinch_start.set(None);
                        touch_start.set(None);
                        touch_did_pan.set(false);
                    },

                    // Zoom/pan applies to every layer at once
                    div {
                        class: "chart-inner",
                        style: "{transform_style}",
                        div { dangerous_inner_html: "{svg_html}" }
                    }
                }
            }
            InfoPanel { blocks: chart.info_blocks() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackview_shared::models::TrackDocument;
    use trackview_shared::tooltip::TooltipStyle;

    const DOC: &str = r#"[
        [[{"longitude":"120.0","latitude":"30.0"},{"longitude":"121.0","latitude":"31.0"}]],
        [[{"longitude":120.2,"latitude":30.2,"speed":9,"course":45,"lastdt":"2024-01-01 08:30:00"},
          {"longitude":120.8,"latitude":30.8}]],
        []
    ]"#;

    fn model() -> ChartModel {
        let doc = TrackDocument::from_json(DOC).unwrap();
        ChartModel::build("case.json", &doc, ChartLayout::default()).unwrap()
    }

    fn all_labels() -> LabelToggles {
        LabelToggles {
            show_time: true,
            show_course: true,
            show_speed: true,
            show_original: true,
        }
    }

    #[test]
    fn test_geometry_hides_originals_by_default() {
        let m = model();
        let mut svg = String::new();
        build_geometry(&mut svg, &m, false);
        assert!(!svg.contains("trajectory-0"));
        assert!(svg.contains("trajectory-line trajectory-1"));
        assert!(!svg.contains("stroke-dasharray"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_geometry_with_originals() {
        let m = model();
        let mut svg = String::new();
        build_geometry(&mut svg, &m, true);
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
        assert!(svg.contains(r#"r="0.5""#));
        assert!(svg.contains(r#"r="4""#));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(r##"fill="green" stroke="#1f77b4""##));
    }

    #[test]
    fn test_start_marker_centred_on_last_point() {
        let m = model();
        let (sx, sy) = m.trajectories[1].pixels[1];
        let mut svg = String::new();
        build_geometry(&mut svg, &m, false);
        assert!(svg.contains(&format!(r#"x="{}" y="{}" width="20" height="20""#, sx - 10.0, sy - 10.0)));
    }

    #[test]
    fn test_labels_empty_with_toggles_off() {
        let mut svg = String::new();
        build_labels(&mut svg, &model(), ZoomTransform::IDENTITY, LabelToggles::default());
        assert!(svg.is_empty());
    }

    #[test]
    fn test_labels_skip_empty_text() {
        let mut svg = String::new();
        build_labels(&mut svg, &model(), ZoomTransform::IDENTITY, all_labels());
        // Only the first sub point carries time, course and speed.
        assert_eq!(svg.matches("<text").count(), 3);
        assert!(svg.contains(">08:30:00</text>"));
        assert!(svg.contains(">45°</text>"));
        assert!(svg.contains(">9 kn</text>"));
        assert!(svg.contains(r#"class="info-label course-label course-label-1""#));
    }

    #[test]
    fn test_labels_outside_viewport_are_culled() {
        let m = model();
        // Zoomed far into the top-left corner, away from every point.
        let transform = ZoomTransform {
            x: 0.0,
            y: 0.0,
            k: 10.0,
        };
        let mut svg = String::new();
        build_labels(&mut svg, &m, transform, all_labels());
        assert!(svg.is_empty());
    }

    #[test]
    fn test_tooltip_svg() {
        let m = model();
        let tooltip = m
            .tooltip(ElementKey::Point {
                trajectory: 1,
                point: 0,
            })
            .unwrap();
        let mut svg = String::new();
        build_tooltip(&mut svg, &tooltip);
        assert!(svg.starts_with(r#"<g class="tooltip""#));
        assert!(svg.contains(r#"width="180" height="80""#));
        assert!(svg.contains("Time: 2024-01-01 08:30:00"));
        assert!(svg.contains("Speed: 9 kn"));
        assert!(!svg.contains("font-weight"));

        let start = m.tooltip(ElementKey::StartMarker { trajectory: 1 }).unwrap();
        assert_eq!(start.style, TooltipStyle::StartMarker);
        let mut svg = String::new();
        build_tooltip(&mut svg, &start);
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains("no speed info"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
        assert_eq!(escape_xml("08:30"), "08:30");
    }

    #[test]
    fn test_svg_wraps_layers_in_order() {
        let svg = build_svg(&ChartLayout::default(), &["<g id=\"a\"/>", "<g id=\"b\"/>"]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 1400 600""#));
        let a = svg.find("id=\"a\"").unwrap();
        let b = svg.find("id=\"b\"").unwrap();
        assert!(a < b);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_container_ids_are_unique_per_chart() {
        assert_ne!(container_id(0), container_id(1));
    }
}
