use k8s_openapi::api::core::v1::{Container, PodTemplateSpec, Volume};

use super::format::{convert_env, format_labels, multiline_string_array};
use super::writer::PrefixWriter;

pub fn describe_pod_template(template: Option<&PodTemplateSpec>, w: &mut PrefixWriter) {
    let Some(template) = template else {
        w.line("  ", "<unset>");
        return;
    };

    let metadata = template.metadata.as_ref();
    w.field("  ", "Labels", format_labels(metadata.and_then(|m| m.labels.as_ref())));
    if let Some(annotations) = metadata
        .and_then(|m| m.annotations.as_ref())
        .filter(|annotations| !annotations.is_empty())
    {
        w.field("  ", "Annotations", format_labels(Some(annotations)));
    }

    let spec = template.spec.as_ref();
    if let Some(account) = spec
        .and_then(|spec| spec.service_account_name.as_deref())
        .filter(|account| !account.is_empty())
    {
        w.field("  ", "Service Account", account);
    }

    if let Some(init) = spec
        .and_then(|spec| spec.init_containers.as_ref())
        .filter(|init| !init.is_empty())
    {
        describe_containers("Init Containers", init, w);
    }
    describe_containers("Containers", spec.map(|spec| spec.containers.as_slice()).unwrap_or_default(), w);
    describe_volumes(spec.and_then(|spec| spec.volumes.as_deref()).unwrap_or_default(), w);
}

fn describe_containers(label: &str, containers: &[Container], w: &mut PrefixWriter) {
    if containers.is_empty() {
        w.field("  ", label, "<none>");
        return;
    }
    w.line("  ", format!("{}:", label));

    for container in containers {
        w.line("   ", format!("{}:", container.name));
        w.field("    ", "Image", container.image.as_deref().unwrap_or("<none>"));

        let ports: Vec<String> = container
            .ports
            .iter()
            .flatten()
            .map(|port| {
                format!(
                    "{}/{}",
                    port.container_port,
                    port.protocol.as_deref().unwrap_or("TCP")
                )
            })
            .collect();
        if ports.is_empty() {
            w.field("    ", "Port", "<none>");
        } else {
            w.field("    ", "Port", ports.join(", "));
        }

        if let Some(command) = container.command.as_ref().filter(|c| !c.is_empty()) {
            w.field("    ", "Command", multiline_string_array("\t  ", command));
        }
        if let Some(args) = container.args.as_ref().filter(|a| !a.is_empty()) {
            w.field("    ", "Args", multiline_string_array("\t  ", args));
        }

        let env = convert_env(container.env.as_deref().unwrap_or_default());
        if env.is_empty() {
            w.field("    ", "Environment", "<none>");
        } else {
            w.line("    ", "Environment:");
            for (name, value) in &env {
                w.field("      ", name, value);
            }
        }
    }
}

fn volume_type(volume: &Volume) -> String {
    if let Some(claim) = &volume.persistent_volume_claim {
        format!("PersistentVolumeClaim ({})", claim.claim_name)
    } else if let Some(config_map) = &volume.config_map {
        format!("ConfigMap ({})", config_map.name.as_deref().unwrap_or_default())
    } else if let Some(secret) = &volume.secret {
        format!("Secret ({})", secret.secret_name.as_deref().unwrap_or_default())
    } else if volume.empty_dir.is_some() {
        "EmptyDir".to_string()
    } else if let Some(host_path) = &volume.host_path {
        format!("HostPath ({})", host_path.path)
    } else {
        "<unknown>".to_string()
    }
}

fn describe_volumes(volumes: &[Volume], w: &mut PrefixWriter) {
    if volumes.is_empty() {
        w.field("  ", "Volumes", "<none>");
        return;
    }
    w.line("  ", "Volumes:");
    for volume in volumes {
        w.field("   ", &volume.name, volume_type(volume));
    }
}
