use crate::k8s::{self, ObjectMeta, Quantity, RecommendedContainerResources, ResourceList};
use chrono::{offset::Utc, TimeZone};

pub fn mk_pod(ns: &str, name: &str, labels: Vec<(&'static str, &'static str)>) -> k8s::Pod {
    k8s::Pod {
        metadata: ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            labels: Some(
                labels
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn mk_vpa(ns: &str, name: &str, created_secs: i64) -> k8s::VerticalPodAutoscaler {
    k8s::VerticalPodAutoscaler {
        metadata: ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            creation_timestamp: Some(k8s::Time(
                Utc.timestamp_opt(created_secs, 0).unwrap(),
            )),
            ..Default::default()
        },
        spec: k8s::VerticalPodAutoscalerSpec {
            target_ref: None,
            update_policy: None,
            resource_policy: None,
        },
        status: None,
    }
}

pub fn selector(key: &'static str, value: &'static str) -> k8s::Selector {
    Some((key, value)).into_iter().collect()
}

pub fn resources(cpu: &str, memory: &str) -> ResourceList {
    [
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ]
    .into_iter()
    .collect()
}

pub fn container_recommendation(
    name: &str,
    cpu: &str,
    memory: &str,
) -> RecommendedContainerResources {
    RecommendedContainerResources {
        container_name: name.to_string(),
        target: resources(cpu, memory),
        ..Default::default()
    }
}
