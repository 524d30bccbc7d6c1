use dioxus::logger::tracing::info;
use dioxus::prelude::*;
use trackview_shared::labels::LabelToggles;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Toggle {
    Time,
    Course,
    Speed,
    Original,
}

impl Toggle {
    const ALL: [Toggle; 4] = [Toggle::Time, Toggle::Course, Toggle::Speed, Toggle::Original];

    fn id(self) -> &'static str {
        match self {
            Toggle::Time => "showTime",
            Toggle::Course => "showCourse",
            Toggle::Speed => "showSpeed",
            Toggle::Original => "showOriginal",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Toggle::Time => "Show time",
            Toggle::Course => "Show course",
            Toggle::Speed => "Show speed",
            Toggle::Original => "Show original trajectories",
        }
    }

    fn get(self, toggles: &LabelToggles) -> bool {
        match self {
            Toggle::Time => toggles.show_time,
            Toggle::Course => toggles.show_course,
            Toggle::Speed => toggles.show_speed,
            Toggle::Original => toggles.show_original,
        }
    }

    fn set(self, toggles: &mut LabelToggles, on: bool) {
        match self {
            Toggle::Time => toggles.show_time = on,
            Toggle::Course => toggles.show_course = on,
            Toggle::Speed => toggles.show_speed = on,
            Toggle::Original => toggles.show_original = on,
        }
    }
}

/// The four checkboxes. Every chart reads the same signal, so one change
/// reaches all of them.
#[component]
pub fn TogglePanel(toggles: Signal<LabelToggles>) -> Element {
    let current = *toggles.read();

    rsx! {
        div { class: "controls",
            for toggle in Toggle::ALL {
                label { key: "{toggle.id()}", class: "toggle",
                    input {
                        r#type: "checkbox",
                        id: toggle.id(),
                        checked: toggle.get(&current),
                        onchange: move |evt: Event<FormData>| {
                            let on = evt.checked();
                            toggle.set(&mut toggles.write(), on);
                            info!(toggle = toggle.id(), on, "Label toggle changed");
                        },
                    }
                    "{toggle.label()}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_ids_match_query_keys() {
        for toggle in Toggle::ALL {
            let mut expected = LabelToggles::default();
            toggle.set(&mut expected, true);
            let from_query = LabelToggles::from_query(&format!("?{}=1", toggle.id()));
            assert_eq!(from_query, expected, "{}", toggle.id());
        }
    }

    #[test]
    fn test_set_and_get_touch_one_field() {
        let mut toggles = LabelToggles::default();
        Toggle::Speed.set(&mut toggles, true);
        assert!(Toggle::Speed.get(&toggles));
        assert!(!Toggle::Time.get(&toggles));
        assert!(!Toggle::Course.get(&toggles));
        assert!(!Toggle::Original.get(&toggles));
        Toggle::Speed.set(&mut toggles, false);
        assert_eq!(toggles, LabelToggles::default());
    }
}
