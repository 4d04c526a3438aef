#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
pub mod quantity;
pub mod vpa;

pub use self::{
    labels::{Selector, SelectorError},
    vpa::{
        ConditionStatus, ConditionType, ContainerControlledValues, ContainerName,
        ContainerResourcePolicy, ContainerScalingMode, PodResourcePolicy, PodUpdatePolicy,
        RecommendedContainerResources, RecommendedPodResources, ResourceList, TargetRef,
        UpdateMode, VerticalPodAutoscaler, VerticalPodAutoscalerCondition,
        VerticalPodAutoscalerSpec, VerticalPodAutoscalerStatus,
    },
};
pub use k8s_openapi::{
    api::{
        self,
        apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
        core::v1::{Container, Pod, PodSpec, PodStatus},
    },
    apimachinery::pkg::{
        api::resource::Quantity,
        apis::meta::v1::{LabelSelector, LabelSelectorRequirement, Time},
    },
};
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Patch, PatchParams, Resource, ResourceExt},
    runtime::watcher,
    Client, Error,
};
