use dioxus::prelude::*;

/// Target info under a chart, one block per target.
#[component]
pub fn InfoPanel(blocks: Vec<Vec<String>>) -> Element {
    if blocks.is_empty() {
        return rsx! {};
    }
    rsx! {
        div { class: "chart-info",
            for (i, lines) in blocks.into_iter().enumerate() {
                div { key: "{i}", class: "target-info",
                    for line in lines {
                        div { "{line}" }
                    }
                }
            }
        }
    }
}
