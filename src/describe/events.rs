use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;

use super::format::human_duration;
use super::writer::PrefixWriter;

fn age(time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match time {
        Some(time) => human_duration(now.signed_duration_since(time)),
        None => "<unknown>".to_string(),
    }
}

fn source(event: &Event) -> String {
    let Some(source) = event.source.as_ref() else {
        return String::new();
    };
    match (source.component.as_deref(), source.host.as_deref()) {
        (Some(component), Some(host)) if !host.is_empty() => format!("{{{} {}}}", component, host),
        (Some(component), _) => format!("{{{} }}", component),
        (None, Some(host)) => format!("{{ {}}}", host),
        (None, None) => String::new(),
    }
}

/// Renders events in the order given.
pub fn describe_events(events: &[Event], now: DateTime<Utc>, w: &mut PrefixWriter) {
    if events.is_empty() {
        w.line("", "No events.");
        return;
    }

    w.line("", "Events:");
    w.line("  ", "FirstSeen\tLastSeen\tCount\tFrom\tSubObjectPath\tType\tReason\tMessage");
    w.line("  ", "---------\t--------\t-----\t----\t-------------\t--------\t------\t-------");
    for event in events {
        let first_seen = event.first_timestamp.as_ref().map(|time| time.0);
        let last_seen = event.last_timestamp.as_ref().map(|time| time.0).or(first_seen);
        w.line(
            "  ",
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                age(first_seen, now),
                age(last_seen, now),
                event.count.unwrap_or(1),
                source(event),
                event.involved_object.field_path.as_deref().unwrap_or_default(),
                event.type_.as_deref().unwrap_or_default(),
                event.reason.as_deref().unwrap_or_default(),
                event.message.as_deref().unwrap_or_default().trim(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use k8s_openapi::api::core::v1::EventSource;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    #[test]
    fn test_no_events() {
        let mut w = PrefixWriter::new();
        describe_events(&[], Utc::now(), &mut w);
        assert_eq!(w.finish(), "No events.\n");
    }

    #[test]
    fn test_event_row() {
        let now = Utc.timestamp_opt(10_000, 0).unwrap();
        let event = Event {
            first_timestamp: Some(Time(now - Duration::minutes(5))),
            last_timestamp: Some(Time(now - Duration::seconds(30))),
            count: Some(2),
            reason: Some("DeploymentCreated".to_string()),
            message: Some("Created new deployment \"frontend-3\"\n".to_string()),
            type_: Some("Normal".to_string()),
            source: Some(EventSource {
                component: Some("deploymentconfig-controller".to_string()),
                host: None,
            }),
            ..Default::default()
        };

        let mut w = PrefixWriter::new();
        describe_events(&[event], now, &mut w);
        let out = w.finish();
        assert!(out.ends_with(
            "  5 minutes\t30 seconds\t2\t{deploymentconfig-controller }\t\tNormal\tDeploymentCreated\tCreated new deployment \"frontend-3\"\n"
        ));
    }
}
