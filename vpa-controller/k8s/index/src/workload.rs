use crate::k8s::{self, LabelSelector, Selector, SelectorError, TargetRef};

/// The kinds of workload controller an autoscaler may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Kind {
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct WorkloadRef {
    pub kind: Kind,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("targetRef is not set")]
    MissingTargetRef,

    #[error("unsupported targetRef kind {0}")]
    UnsupportedKind(String),

    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} {name} has no pod selector")]
    MissingSelector { kind: String, name: String },

    #[error("invalid pod selector: {0}")]
    InvalidSelector(#[from] SelectorError),
}

/// Reads the pod selector of a workload controller.
pub(crate) trait Workload {
    const KIND: Kind;

    fn pod_selector(&self) -> Option<&LabelSelector>;
}

// === impl Kind ===

impl Kind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::ReplicaSet => "ReplicaSet",
        }
    }
}

impl std::str::FromStr for Kind {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deployment" => Ok(Self::Deployment),
            "StatefulSet" => Ok(Self::StatefulSet),
            "DaemonSet" => Ok(Self::DaemonSet),
            "ReplicaSet" => Ok(Self::ReplicaSet),
            kind => Err(TargetError::UnsupportedKind(kind.to_string())),
        }
    }
}

// === impl WorkloadRef ===

impl WorkloadRef {
    pub(crate) fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl TryFrom<Option<&TargetRef>> for WorkloadRef {
    type Error = TargetError;

    fn try_from(target: Option<&TargetRef>) -> Result<Self, Self::Error> {
        let target = target.ok_or(TargetError::MissingTargetRef)?;
        Ok(Self::new(target.kind.parse()?, target.name.clone()))
    }
}

/// Compiles a workload's pod selector.
pub(crate) fn compile<W: Workload>(name: &str, workload: &W) -> Result<Selector, TargetError> {
    let selector = workload
        .pod_selector()
        .ok_or_else(|| TargetError::MissingSelector {
            kind: W::KIND.as_str().to_string(),
            name: name.to_string(),
        })?;
    Ok(Selector::try_from(selector)?)
}

// === impl Workload ===

impl Workload for k8s::Deployment {
    const KIND: Kind = Kind::Deployment;

    fn pod_selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl Workload for k8s::StatefulSet {
    const KIND: Kind = Kind::StatefulSet;

    fn pod_selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl Workload for k8s::DaemonSet {
    const KIND: Kind = Kind::DaemonSet;

    fn pod_selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl Workload for k8s::ReplicaSet {
    const KIND: Kind = Kind::ReplicaSet;

    fn pod_selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}
