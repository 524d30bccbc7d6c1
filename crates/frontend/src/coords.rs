use trackview_shared::scale::ChartLayout;
use trackview_shared::view::ZoomTransform;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Container-relative pixels to chart pixels. The chart may be rendered
/// narrower than its layout width, so both axes are rescaled by the width
/// ratio.
pub fn container_to_chart(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    layout: &ChartLayout,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 {
        return None;
    }
    let ratio = layout.width / container_w;
    Some((container_x * ratio, container_y * ratio))
}

/// Chart pixels under the pointer, before undoing the zoom transform.
pub fn client_to_chart(client_x: f64, client_y: f64, container_id: &str, layout: &ChartLayout) -> Option<(f64, f64)> {
    let rect = element_rect(container_id)?;
    let (cx, cy) = client_to_container(client_x, client_y, rect.left(), rect.top());
    container_to_chart(cx, cy, rect.width(), layout)
}

/// Pointer position in the chart's local (pre-zoom) space, which is where
/// points, markers and label anchors live.
pub fn client_to_local(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    layout: &ChartLayout,
    transform: &ZoomTransform,
) -> Option<(f64, f64)> {
    client_to_chart(client_x, client_y, container_id, layout).map(|p| transform.invert(p))
}

pub fn element_rect(id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect())
}

/// Search part of the page URL, e.g. `?showTime=1`.
pub fn page_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_container_origin() {
        let (x, y) = client_to_container(100.0, 200.0, 100.0, 200.0);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_client_to_container_offset() {
        let (x, y) = client_to_container(450.0, 350.0, 320.0, 50.0);
        assert!((x - 130.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_chart_full_size() {
        let layout = ChartLayout::default();
        let (x, y) = container_to_chart(700.0, 300.0, 1400.0, &layout).unwrap();
        assert!((x - 700.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_chart_half_size() {
        let layout = ChartLayout::default();
        let (x, y) = container_to_chart(350.0, 150.0, 700.0, &layout).unwrap();
        assert!((x - 700.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_chart_invalid_container() {
        assert!(container_to_chart(1.0, 1.0, 0.0, &ChartLayout::default()).is_none());
    }

    #[test]
    fn test_zoomed_pointer_maps_to_local_space() {
        let layout = ChartLayout::default();
        let transform = ZoomTransform {
            x: -700.0,
            y: -300.0,
            k: 2.0,
        };
        let chart = container_to_chart(700.0, 300.0, 1400.0, &layout).unwrap();
        let (lx, ly) = transform.invert(chart);
        assert!((lx - 700.0).abs() < 1e-9);
        assert!((ly - 300.0).abs() < 1e-9);
    }
}
