use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Event, ReplicationController};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, warn};

use super::events::describe_events;
use super::format::{
    convert_env, format_int_or_string, format_labels, format_relative_time, multiline_string_array,
};
use super::pod_template::describe_pod_template;
use super::writer::PrefixWriter;
use super::DescriberSettings;
use crate::error::Result;
use crate::graph::{relevant_deployments, HistoryLimit, LineageGraph};
use crate::models::deployment::{self, config_selector};
use crate::models::deployment_config::{
    DeploymentStrategy, DeploymentTriggerPolicy, HookAction, LifecycleHook, DEPLOYMENT_CONFIG_KIND,
};
use crate::models::DeploymentConfig;
use crate::status::pod_phase_counts;
use crate::storage::ClusterReader;

/// Renders a deployment config together with its latest and prior deployments.
pub struct DeploymentConfigDescriber<'a, R: ?Sized> {
    reader: &'a R,
    config: Option<DeploymentConfig>,
    settings: DescriberSettings,
    now: DateTime<Utc>,
}

impl<'a, R: ClusterReader + ?Sized> DeploymentConfigDescriber<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self {
            reader,
            config: None,
            settings: DescriberSettings::default(),
            now: Utc::now(),
        }
    }

    /// Describes `config` as given instead of fetching it, e.g. to preview a
    /// rollback. Prior deployments are not listed in this mode.
    pub fn with_config(reader: &'a R, config: DeploymentConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new(reader)
        }
    }

    pub fn settings(mut self, settings: DescriberSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reference time for relative ages.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn describe(&self, namespace: &str, name: &str) -> Result<String> {
        let (config, show_history) = match &self.config {
            Some(config) => (config.clone(), false),
            None => (self.reader.get_deployment_config(namespace, name).await?, true),
        };
        let namespace = config
            .metadata
            .namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| namespace.to_string());

        let mut w = PrefixWriter::new();
        format_meta(&mut w, &config.metadata, self.now);

        if config.status.latest_version == 0 {
            w.field("", "Latest Version", "Not deployed");
        } else {
            w.field("", "Latest Version", config.status.latest_version.to_string());
        }

        self.print_spec(&namespace, &config, &mut w).await;
        w.blank();

        if let Some(message) = config.failure_message() {
            w.field("", "Warning", message);
        }

        let controllers = if show_history {
            self.list_deployments(&namespace, &config).await
        } else {
            Vec::new()
        };
        let (graph, root) = LineageGraph::build(&config, controllers);
        let relevant = relevant_deployments(
            &graph,
            root,
            HistoryLimit::Count(self.settings.max_deployments),
        );

        let active_name = match relevant.active.and_then(|index| graph.deployment(index)) {
            Some(node) => {
                let header = format!("Deployment #{} (latest)", config.status.latest_version);
                self.print_deployment(&node.controller, &header, true, &mut w).await;
                Some(node.name().to_string())
            }
            None => self.print_latest_by_name(&namespace, &config, &mut w).await,
        };

        for node in relevant.inactive.iter().filter_map(|&index| graph.deployment(index)) {
            if active_name.as_deref() == Some(node.name()) {
                continue;
            }
            let header = format!("Deployment #{}", version_label(node.version));
            self.print_deployment(&node.controller, &header, self.settings.verbose_history, &mut w)
                .await;
        }

        if self.settings.show_events {
            self.print_events(&namespace, &config, &mut w).await;
        }

        Ok(w.finish())
    }

    async fn list_deployments(
        &self,
        namespace: &str,
        config: &DeploymentConfig,
    ) -> Vec<ReplicationController> {
        match self
            .reader
            .list_replication_controllers(namespace, &config_selector(config.name()))
            .await
        {
            Ok(controllers) => controllers,
            Err(e) => {
                warn!(
                    "Failed to list deployments for {}/{}: {}",
                    namespace,
                    config.name(),
                    e
                );
                Vec::new()
            }
        }
    }

    // Fast path for when the latest deployment was not among the listed ones.
    async fn print_latest_by_name(
        &self,
        namespace: &str,
        config: &DeploymentConfig,
        w: &mut PrefixWriter,
    ) -> Option<String> {
        if config.status.latest_version == 0 {
            w.field("", "Latest Deployment", "<none>");
            return None;
        }

        match self
            .reader
            .get_replication_controller(namespace, &config.latest_deployment_name())
            .await
        {
            Ok(controller) => {
                let version = deployment::version_for(&controller)
                    .unwrap_or(config.status.latest_version);
                let header = format!("Deployment #{} (latest)", version);
                self.print_deployment(&controller, &header, true, w).await;
                Some(deployment::name_of(&controller).to_string())
            }
            Err(e) if e.is_not_found() => {
                w.field("", "Latest Deployment", "<none>");
                None
            }
            Err(e) => {
                w.field("", "Latest Deployment", format!("error: {}", e));
                None
            }
        }
    }

    async fn print_spec(&self, namespace: &str, config: &DeploymentConfig, w: &mut PrefixWriter) {
        let spec = &config.spec;

        // Selector
        w.field("", "Selector", format_labels(Some(&spec.selector)));

        // Replicas
        let test = if spec.test {
            " (test, will be scaled down between deployments)"
        } else {
            ""
        };
        w.field("", "Replicas", format!("{}{}", spec.replicas, test));

        // Autoscaling info
        self.print_autoscaling(namespace, config, w).await;

        // Triggers
        print_triggers(&spec.triggers, w);

        // Strategy
        match &spec.strategy {
            Some(strategy) => {
                w.field("", "Strategy", strategy.name());
                print_strategy(strategy, "  ", w);
            }
            None => w.field("", "Strategy", "<none>"),
        }

        // Pod template
        w.line("", "Template:");
        describe_pod_template(spec.template.as_ref(), w);
    }

    async fn print_autoscaling(&self, namespace: &str, config: &DeploymentConfig, w: &mut PrefixWriter) {
        let autoscalers = match self.reader.list_autoscalers(namespace).await {
            Ok(autoscalers) => autoscalers,
            Err(e) => {
                debug!("Skipping autoscaling info for {}/{}: {}", namespace, config.name(), e);
                return;
            }
        };

        let mut scaled_by = autoscalers
            .iter()
            .filter_map(|hpa| hpa.spec.as_ref())
            .filter(|spec| {
                spec.scale_target_ref.kind == DEPLOYMENT_CONFIG_KIND
                    && spec.scale_target_ref.name == config.name()
            });

        // Only the first binding is shown.
        if let Some(spec) = scaled_by.next() {
            let cpu = spec
                .target_cpu_utilization_percentage
                .map(|percentage| format!(", triggered at {}% CPU usage", percentage))
                .unwrap_or_default();
            w.field(
                "",
                "Autoscaling",
                format!(
                    "between {} and {} replicas{}",
                    spec.min_replicas.unwrap_or(1),
                    spec.max_replicas,
                    cpu
                ),
            );

            let ignored = scaled_by.count();
            if ignored > 0 {
                debug!("{} more autoscalers target {}/{}", ignored, namespace, config.name());
            }
        }
    }

    async fn print_deployment(
        &self,
        controller: &ReplicationController,
        header: &str,
        verbose: bool,
        w: &mut PrefixWriter,
    ) {
        w.line("", format!("{}:", header));

        if verbose {
            w.field("\t", "Name", deployment::name_of(controller));
        }
        let created = deployment::created_at(controller)
            .map(|created| format!("{} ago", format_relative_time(created, self.now)))
            .unwrap_or_else(|| "<unknown>".to_string());
        w.field("\t", "Created", created);
        w.field("\t", "Status", deployment::phase_for(controller).as_str());
        w.field(
            "\t",
            "Replicas",
            format!(
                "{} current / {} desired",
                deployment::current_replicas(controller),
                deployment::desired_replicas(controller)
            ),
        );

        if verbose {
            w.field("\t", "Selector", format_labels(Some(&deployment::selector_for(controller))));
            w.field("\t", "Labels", format_labels(controller.metadata.labels.as_ref()));
            match pod_phase_counts(self.reader, controller).await {
                Ok(counts) => w.field(
                    "\t",
                    "Pods Status",
                    format!(
                        "{} Running / {} Waiting / {} Succeeded / {} Failed",
                        counts.running, counts.waiting, counts.succeeded, counts.failed
                    ),
                ),
                Err(e) => w.field("\t", "Pods Status", format!("error: {}", e)),
            }
        }
    }

    async fn print_events(&self, namespace: &str, config: &DeploymentConfig, w: &mut PrefixWriter) {
        match self
            .reader
            .search_events(namespace, DEPLOYMENT_CONFIG_KIND, config.name())
            .await
        {
            Ok(events) => {
                let recent: Vec<Event> = events
                    .iter()
                    .rev()
                    .take(self.settings.max_events)
                    .cloned()
                    .collect();
                w.blank();
                describe_events(&recent, self.now, w);
            }
            Err(e) => debug!("Skipping events for {}/{}: {}", namespace, config.name(), e),
        }
    }
}

fn version_label(version: Option<i64>) -> String {
    version
        .map(|version| version.to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn format_meta(w: &mut PrefixWriter, meta: &ObjectMeta, now: DateTime<Utc>) {
    w.field("", "Name", meta.name.as_deref().unwrap_or_default());
    w.field("", "Namespace", meta.namespace.as_deref().unwrap_or_default());
    if let Some(created) = &meta.creation_timestamp {
        w.field("", "Created", format!("{} ago", format_relative_time(created.0, now)));
    }
    w.field("", "Labels", format_labels(meta.labels.as_ref()));

    match meta.annotations.as_ref().filter(|annotations| !annotations.is_empty()) {
        Some(annotations) => {
            for (i, (key, value)) in annotations.iter().enumerate() {
                if i == 0 {
                    w.field("", "Annotations", format!("{}={}", key, value));
                } else {
                    w.line("\t", format!("{}={}", key, value));
                }
            }
        }
        None => w.field("", "Annotations", "<none>"),
    }
}

pub fn print_triggers(triggers: &[DeploymentTriggerPolicy], w: &mut PrefixWriter) {
    let labels: Vec<String> = triggers
        .iter()
        .filter_map(|trigger| match trigger {
            DeploymentTriggerPolicy::ConfigChange => Some("Config".to_string()),
            DeploymentTriggerPolicy::ImageChange { params } => {
                params.stream_and_tag().map(|(stream, tag)| {
                    format!("Image({}@{}, auto={})", stream, tag, params.automatic)
                })
            }
            DeploymentTriggerPolicy::Unknown => None,
        })
        .collect();

    if labels.is_empty() {
        w.field("", "Triggers", "<none>");
    } else {
        w.field("", "Triggers", labels.join(", "));
    }
}

pub fn print_strategy(strategy: &DeploymentStrategy, indent: &str, w: &mut PrefixWriter) {
    match strategy {
        DeploymentStrategy::Custom { params: Some(params) } => {
            if params.image.is_empty() {
                w.field(indent, "Image", "<default>");
            } else {
                w.field(indent, "Image", &params.image);
            }
            if !params.environment.is_empty() {
                w.field(indent, "Environment", format_labels(Some(&convert_env(&params.environment))));
            }
            if !params.command.is_empty() {
                w.field(indent, "Command", multiline_string_array("\t  ", &params.command));
            }
        }
        DeploymentStrategy::Recreate { params: Some(params) } => {
            let hooks = [
                ("Pre-deployment", &params.pre),
                ("Mid-deployment", &params.mid),
                ("Post-deployment", &params.post),
            ];
            for (prefix, hook) in hooks {
                if let Some(hook) = hook {
                    print_hook(prefix, hook, indent, w);
                }
            }
        }
        DeploymentStrategy::Rolling { params: Some(params) } => {
            if let Some(seconds) = params.update_period_seconds {
                w.field(indent, "Update Period", format!("{}s", seconds));
            }
            if let Some(seconds) = params.interval_seconds {
                w.field(indent, "Interval", format!("{}s", seconds));
            }
            if let Some(seconds) = params.timeout_seconds {
                w.field(indent, "Timeout", format!("{}s", seconds));
            }
            if let Some(value) = &params.max_unavailable {
                w.field(indent, "MaxUnavailable", format_int_or_string(value));
            }
            if let Some(value) = &params.max_surge {
                w.field(indent, "MaxSurge", format_int_or_string(value));
            }
            let hooks = [("Pre-deployment", &params.pre), ("Post-deployment", &params.post)];
            for (prefix, hook) in hooks {
                if let Some(hook) = hook {
                    print_hook(prefix, hook, indent, w);
                }
            }
        }
        DeploymentStrategy::Custom { params: None }
        | DeploymentStrategy::Recreate { params: None }
        | DeploymentStrategy::Rolling { params: None }
        | DeploymentStrategy::Unknown(_) => {}
    }
}

pub fn print_hook(prefix: &str, hook: &LifecycleHook, indent: &str, w: &mut PrefixWriter) {
    let nested = format!("{}  ", indent);
    match &hook.action {
        Some(HookAction::ExecNewPod(exec)) => {
            w.line(
                indent,
                format!("{} hook (pod type, failure policy: {}):", prefix, hook.failure_policy),
            );
            w.field(&nested, "Container", &exec.container_name);
            w.field(&nested, "Command", multiline_string_array("\t  ", &exec.command));
            if !exec.env.is_empty() {
                w.field(&nested, "Env", format_labels(Some(&convert_env(&exec.env))));
            }
        }
        Some(HookAction::TagImages(tags)) => {
            w.line(
                indent,
                format!("{} hook (tag images, failure policy: {}):", prefix, hook.failure_policy),
            );
            for tag in tags {
                let target = format!(
                    "container {} to {} {} {}",
                    tag.container_name,
                    tag.to.kind.as_deref().unwrap_or_default(),
                    tag.to.name.as_deref().unwrap_or_default(),
                    tag.to.namespace.as_deref().unwrap_or_default()
                );
                w.field(&nested, "Tag", target.trim_end());
            }
        }
        None => w.field(
            indent,
            &format!("{} hook (failure policy: {})", prefix, hook.failure_policy),
            "<none>",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone};
    use k8s_openapi::api::autoscaling::v1::{
        CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    };
    use k8s_openapi::api::core::v1::{
        Container, ObjectReference, PodSpec, PodTemplateSpec, ReplicationControllerSpec,
        ReplicationControllerStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    use crate::models::deployment::{
        DEPLOYMENT_CONFIG_ANNOTATION, DEPLOYMENT_CONFIG_LABEL, DEPLOYMENT_PHASE_ANNOTATION,
        DEPLOYMENT_VERSION_ANNOTATION,
    };
    use crate::models::deployment_config::{
        CustomParams, ExecNewPodHook, FailurePolicy, ImageChangeParams, RecreateParams, RollingParams,
        TagImageHook,
    };
    use crate::storage::reader::fake::{pod, FakeReader};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn controller(version: i64, phase: &str, age: Duration, current: i32) -> ReplicationController {
        let name = deployment::deployment_name("frontend", version);
        let annotations: BTreeMap<String, String> = [
            (DEPLOYMENT_CONFIG_ANNOTATION, "frontend".to_string()),
            (DEPLOYMENT_VERSION_ANNOTATION, version.to_string()),
            (DEPLOYMENT_PHASE_ANNOTATION, phase.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        ReplicationController {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                namespace: Some("test".to_string()),
                labels: Some([(DEPLOYMENT_CONFIG_LABEL.to_string(), "frontend".to_string())].into()),
                annotations: Some(annotations),
                creation_timestamp: Some(Time(now() - age)),
                ..Default::default()
            },
            spec: Some(ReplicationControllerSpec {
                replicas: Some(2),
                selector: Some([("deployment".to_string(), name)].into()),
                ..Default::default()
            }),
            status: Some(ReplicationControllerStatus {
                replicas: current,
                ..Default::default()
            }),
        }
    }

    fn autoscaler(name: &str, min: i32, max: i32, cpu: Option<i32>) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: Some(HorizontalPodAutoscalerSpec {
                min_replicas: Some(min),
                max_replicas: max,
                target_cpu_utilization_percentage: cpu,
                scale_target_ref: CrossVersionObjectReference {
                    kind: DEPLOYMENT_CONFIG_KIND.to_string(),
                    name: "frontend".to_string(),
                    api_version: None,
                },
            }),
            ..Default::default()
        }
    }

    fn event(index: i64) -> Event {
        Event {
            involved_object: ObjectReference {
                kind: Some(DEPLOYMENT_CONFIG_KIND.to_string()),
                name: Some("frontend".to_string()),
                ..Default::default()
            },
            reason: Some(format!("Event{}", index)),
            message: Some(format!("message {}", index)),
            type_: Some("Normal".to_string()),
            first_timestamp: Some(Time(now() - Duration::minutes(20 - index))),
            ..Default::default()
        }
    }

    fn frontend_config() -> DeploymentConfig {
        let mut config = DeploymentConfig::new("test", "frontend");
        config.metadata.creation_timestamp = Some(Time(now() - Duration::hours(1)));
        config.metadata.labels = Some([("app".to_string(), "shop".to_string())].into());
        config.status.latest_version = 3;
        config.spec.replicas = 2;
        config.spec.selector = [("app".to_string(), "shop".to_string())].into();
        let mut image = ImageChangeParams {
            automatic: true,
            ..Default::default()
        };
        image.from.name = Some("shop:v2".to_string());
        config.spec.triggers = vec![
            DeploymentTriggerPolicy::ConfigChange,
            DeploymentTriggerPolicy::ImageChange { params: image },
        ];
        config.spec.strategy = Some(DeploymentStrategy::Rolling {
            params: Some(RollingParams {
                update_period_seconds: Some(1),
                timeout_seconds: Some(600),
                pre: Some(LifecycleHook {
                    failure_policy: FailurePolicy::Abort,
                    action: Some(HookAction::ExecNewPod(ExecNewPodHook {
                        container_name: "web".to_string(),
                        command: vec!["rake".to_string(), "db:migrate".to_string()],
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            }),
        });
        config.spec.template = Some(PodTemplateSpec {
            metadata: None,
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "web".to_string(),
                    image: Some("shop:v2".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        });
        config
    }

    fn frontend_reader() -> FakeReader {
        FakeReader {
            configs: vec![frontend_config()],
            controllers: vec![
                controller(1, "Complete", Duration::hours(3), 0),
                controller(3, "Running", Duration::minutes(5), 1),
                controller(2, "Failed", Duration::hours(2), 0),
            ],
            pods: vec![
                pod("frontend-3-a", &[("deployment", "frontend-3")], "Running"),
                pod("frontend-3-b", &[("deployment", "frontend-3")], "Pending"),
                pod("frontend-1-a", &[("deployment", "frontend-1")], "Succeeded"),
            ],
            autoscalers: vec![
                autoscaler("first", 1, 5, Some(80)),
                autoscaler("second", 2, 9, None),
            ],
            events: (0..10).map(event).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_describe_full_config() {
        let reader = frontend_reader();
        let out = DeploymentConfigDescriber::new(&reader)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        let head = "Name:\tfrontend\n\
                    Namespace:\ttest\n\
                    Created:\tabout an hour ago\n\
                    Labels:\tapp=shop\n\
                    Annotations:\t<none>\n\
                    Latest Version:\t3\n\
                    Selector:\tapp=shop\n\
                    Replicas:\t2\n\
                    Autoscaling:\tbetween 1 and 5 replicas, triggered at 80% CPU usage\n\
                    Triggers:\tConfig, Image(shop@v2, auto=true)\n\
                    Strategy:\tRolling\n\
                    \x20 Update Period:\t1s\n\
                    \x20 Timeout:\t600s\n\
                    \x20 Pre-deployment hook (pod type, failure policy: Abort):\n\
                    \x20   Container:\tweb\n\
                    \x20   Command:\trake db:migrate\n\
                    Template:\n";
        assert!(out.starts_with(head), "unexpected output:\n{}", out);
        assert!(!out.contains("between 2 and 9"));

        let deployments = "\n\
                           Deployment #3 (latest):\n\
                           \tName:\tfrontend-3\n\
                           \tCreated:\t5 minutes ago\n\
                           \tStatus:\tRunning\n\
                           \tReplicas:\t1 current / 2 desired\n\
                           \tSelector:\tdeployment=frontend-3\n\
                           \tLabels:\topenshift.io/deployment-config.name=frontend\n\
                           \tPods Status:\t1 Running / 1 Waiting / 0 Succeeded / 0 Failed\n\
                           Deployment #2:\n\
                           \tCreated:\t2 hours ago\n\
                           \tStatus:\tFailed\n\
                           \tReplicas:\t0 current / 2 desired\n\
                           Deployment #1:\n\
                           \tCreated:\t3 hours ago\n\
                           \tStatus:\tComplete\n\
                           \tReplicas:\t0 current / 2 desired\n\
                           \n\
                           Events:\n";
        assert!(out.contains(deployments), "unexpected output:\n{}", out);

        // Only the latest deployment needs a pod query.
        assert_eq!(reader.pod_queries(), 1);
    }

    #[tokio::test]
    async fn test_events_are_newest_first_and_capped() {
        let reader = frontend_reader();
        let out = DeploymentConfigDescriber::new(&reader)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        let reasons: Vec<&str> = out
            .lines()
            .filter_map(|line| line.split('\t').nth(6))
            .filter(|reason| reason.starts_with("Event"))
            .collect();
        assert_eq!(
            reasons,
            vec!["Event9", "Event8", "Event7", "Event6", "Event5", "Event4", "Event3", "Event2"]
        );
    }

    #[tokio::test]
    async fn test_describe_is_idempotent() {
        let reader = frontend_reader();
        let describer = DeploymentConfigDescriber::new(&reader).at(now());
        let first = describer.describe("test", "frontend").await.unwrap();
        let second = describer.describe("test", "frontend").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_not_deployed_custom_strategy() {
        let mut config = DeploymentConfig::new("test", "worker");
        config.spec.replicas = 1;
        config.spec.test = true;
        config.spec.strategy = Some(DeploymentStrategy::Custom {
            params: Some(CustomParams::default()),
        });
        let reader = FakeReader {
            configs: vec![config],
            controllers: vec![controller(1, "Complete", Duration::hours(1), 0)],
            ..Default::default()
        };

        let out = DeploymentConfigDescriber::new(&reader)
            .settings(DescriberSettings {
                show_events: false,
                ..Default::default()
            })
            .at(now())
            .describe("test", "worker")
            .await
            .unwrap();

        assert_eq!(
            out,
            "Name:\tworker\n\
             Namespace:\ttest\n\
             Labels:\t<none>\n\
             Annotations:\t<none>\n\
             Latest Version:\tNot deployed\n\
             Selector:\t<none>\n\
             Replicas:\t1 (test, will be scaled down between deployments)\n\
             Triggers:\t<none>\n\
             Strategy:\tCustom\n\
             \x20 Image:\t<default>\n\
             Template:\n\
             \x20 <unset>\n\
             \n\
             Latest Deployment:\t<none>\n"
        );
    }

    #[tokio::test]
    async fn test_missing_config_is_an_error() {
        let reader = FakeReader::default();
        let err = DeploymentConfigDescriber::new(&reader)
            .describe("test", "ghost")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_collaborator_failures_degrade_sections() {
        let mut reader = frontend_reader();
        reader.fail_controller_list = true;
        reader.fail_controller_get = true;
        reader.fail_autoscalers = true;
        reader.fail_events = true;

        let out = DeploymentConfigDescriber::new(&reader)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        assert!(out.contains("Latest Deployment:\terror: connection refused\n"));
        assert!(!out.contains("Autoscaling:"));
        assert!(!out.contains("Events:"));
        assert!(!out.contains("Deployment #2"));
    }

    #[tokio::test]
    async fn test_pod_query_failure_is_inline() {
        let mut reader = frontend_reader();
        reader.fail_pods = true;
        let out = DeploymentConfigDescriber::new(&reader)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();
        assert!(out.contains("\tPods Status:\terror: connection refused\n"));
        assert!(out.contains("Deployment #1:\n"));
    }

    #[tokio::test]
    async fn test_with_config_skips_history() {
        let reader = frontend_reader();
        let mut config = frontend_config();
        config.status.details = Some(crate::models::deployment_config::DeploymentDetails {
            message: "image shop:v3 not found".to_string(),
            causes: Vec::new(),
        });

        let out = DeploymentConfigDescriber::with_config(&reader, config)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        assert!(out.contains("\nWarning:\timage shop:v3 not found\nDeployment #3 (latest):\n"));
        assert!(!out.contains("Deployment #2:"));
    }

    #[tokio::test]
    async fn test_verbose_history_and_custom_cap() {
        let reader = frontend_reader();
        let out = DeploymentConfigDescriber::new(&reader)
            .settings(DescriberSettings {
                show_events: false,
                max_deployments: 1,
                max_events: 8,
                verbose_history: true,
            })
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        assert!(out.contains("Deployment #2:\n\tName:\tfrontend-2\n"));
        assert!(out.contains("\tPods Status:\t0 Running / 0 Waiting / 0 Succeeded / 0 Failed\n"));
        assert!(!out.contains("Deployment #1:"));
        assert_eq!(reader.pod_queries(), 2);
    }

    #[test]
    fn test_recreate_hooks_render_in_order() {
        let strategy = DeploymentStrategy::Recreate {
            params: Some(RecreateParams {
                pre: Some(LifecycleHook {
                    failure_policy: FailurePolicy::Retry,
                    action: Some(HookAction::TagImages(vec![TagImageHook {
                        container_name: "web".to_string(),
                        to: ObjectReference {
                            kind: Some("ImageStreamTag".to_string()),
                            name: Some("shop:prod".to_string()),
                            ..Default::default()
                        },
                    }])),
                }),
                post: Some(LifecycleHook {
                    failure_policy: FailurePolicy::Ignore,
                    action: None,
                }),
                ..Default::default()
            }),
        };

        let mut w = PrefixWriter::new();
        print_strategy(&strategy, "  ", &mut w);
        assert_eq!(
            w.finish(),
            "  Pre-deployment hook (tag images, failure policy: Retry):\n\
             \x20   Tag:\tcontainer web to ImageStreamTag shop:prod\n\
             \x20 Post-deployment hook (failure policy: Ignore):\t<none>\n"
        );
    }

    #[tokio::test]
    async fn test_unmodelled_strategy_and_version_render_by_name() {
        let mut config = frontend_config();
        config.spec.strategy = Some(DeploymentStrategy::Unknown("BlueGreen".to_string()));
        let mut stray = controller(1, "Failed", Duration::hours(1), 0);
        stray.metadata.name = Some("frontend-stray".to_string());
        stray
            .metadata
            .annotations
            .as_mut()
            .unwrap()
            .insert(DEPLOYMENT_VERSION_ANNOTATION.to_string(), i64::MIN.to_string());
        let reader = FakeReader {
            configs: vec![config],
            controllers: vec![stray, controller(3, "Running", Duration::minutes(5), 1)],
            ..Default::default()
        };

        let out = DeploymentConfigDescriber::new(&reader)
            .at(now())
            .describe("test", "frontend")
            .await
            .unwrap();

        assert!(out.contains("Strategy:\tBlueGreen\nTemplate:\n"));
        assert!(out.contains("Deployment #3 (latest):\n"));
        assert!(out.contains("Deployment #<unknown>:\n\tCreated:\tabout an hour ago\n"));
    }

    #[test]
    fn test_triggers_without_image_name_are_skipped() {
        let mut w = PrefixWriter::new();
        print_triggers(
            &[DeploymentTriggerPolicy::ImageChange {
                params: ImageChangeParams::default(),
            }],
            &mut w,
        );
        assert_eq!(w.finish(), "Triggers:\t<none>\n");
    }
}
