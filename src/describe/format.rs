use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::core::v1::EnvVar;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// `k=v` pairs in key order joined by commas, or `<none>`.
pub fn format_labels(labels: Option<&BTreeMap<String, String>>) -> String {
    match labels {
        Some(labels) if !labels.is_empty() => labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(","),
        _ => "<none>".to_string(),
    }
}

pub fn convert_env(env: &[EnvVar]) -> BTreeMap<String, String> {
    env.iter()
        .map(|var| {
            let value = match (&var.value, &var.value_from) {
                (Some(value), _) => value.clone(),
                (None, Some(_)) => "<set from source>".to_string(),
                (None, None) => String::new(),
            };
            (var.name.clone(), value)
        })
        .collect()
}

pub fn format_int_or_string(value: &IntOrString) -> String {
    match value {
        IntOrString::Int(i) => i.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}

/// Approximate, human friendly rendering of a duration.
pub fn human_duration(d: Duration) -> String {
    let seconds = d.num_seconds();
    if seconds < 1 {
        return "Less than a second".to_string();
    }
    if seconds == 1 {
        return "1 second".to_string();
    }
    if seconds < 60 {
        return format!("{} seconds", seconds);
    }

    let minutes = d.num_minutes();
    if minutes == 1 {
        return "About a minute".to_string();
    }
    if minutes < 46 {
        return format!("{} minutes", minutes);
    }

    let hours = (seconds as f64 / 3600.0 + 0.5) as i64;
    if hours == 1 {
        "About an hour".to_string()
    } else if hours < 48 {
        format!("{} hours", hours)
    } else if hours < 24 * 7 * 2 {
        format!("{} days", hours / 24)
    } else if hours < 24 * 30 * 2 {
        format!("{} weeks", hours / 24 / 7)
    } else if hours < 24 * 365 * 2 {
        format!("{} months", hours / 24 / 30)
    } else {
        format!("{} years", d.num_hours() / 24 / 365)
    }
}

/// Lowercased age of `then` relative to `now`, e.g. `about a minute`.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    human_duration(now.signed_duration_since(then)).to_lowercase()
}

/// Joins command tokens with spaces. Tokens spanning several lines are moved
/// onto their own continuation lines, each prefixed with `indent`.
pub fn multiline_string_array(indent: &str, args: &[String]) -> String {
    let parts: Vec<String> = args
        .iter()
        .map(|arg| {
            let arg = arg.trim_end_matches(|c: char| c == '\n' || c == ' ');
            if arg.contains('\n') {
                let continuation = format!("\n{}", indent);
                format!("{}{}", continuation, arg.split('\n').collect::<Vec<_>>().join(&continuation))
            } else {
                arg.to_string()
            }
        })
        .collect();
    parts.join(" ")
}
