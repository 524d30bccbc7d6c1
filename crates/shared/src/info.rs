use serde_json::Value;

use crate::models::TargetInfo;

/// Text for an info value: strings verbatim, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness, which is what decided whether the generator's
/// fields were worth showing.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn shown(value: &Option<Value>) -> Option<String> {
    value.as_ref().filter(|v| truthy(v)).map(value_text)
}

/// Lines of the info block for one target, in display order.
pub fn info_lines(target: &TargetInfo) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(case) = &target.case_num {
        lines.push(format!("Case: {}", value_text(case)));
    }
    if let Some(direction) = shown(&target.direction) {
        lines.push(format!("Sample: {direction}"));
    }
    if let Some(id) = shown(&target.id) {
        lines.push(format!("ID1: {id}"));
    }
    if let Some(t) = shown(&target.id1_starttime) {
        lines.push(format!("Appeared: {t}"));
    }
    if let Some(t) = shown(&target.id1_endtime) {
        lines.push(format!("Disappeared: {t}"));
    }
    if let Some(gap) = shown(&target.gap_range) {
        lines.push(format!("Gap: {gap} min"));
    }
    if let Some(id2) = shown(&target.id2) {
        lines.push(format!("ID2: {id2}"));
        if let Some(t) = shown(&target.id2_starttime) {
            lines.push(format!("Appeared: {t}"));
        }
        if let Some(t) = shown(&target.id2_endtime) {
            lines.push(format!("Disappeared: {t}"));
        }
    }
    lines
}
