#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decides which autoscaler governs a pod, which container policy applies to
//! a container, and whether a policy object's persisted status must be
//! rewritten.
//!
//! Everything here is a pure function of its inputs, except
//! [`update_vpa_status_if_needed`], which issues at most one write through an
//! injected [`UpdateVpaStatus`] client.

mod conditions;
pub mod container_policy;
mod controlling;
mod matcher;
mod status;
mod vpa;

#[cfg(test)]
mod tests;

pub use self::{
    conditions::{Condition, Conditions},
    controlling::controlling_vpa_for_pod,
    matcher::pod_matches_vpa,
    status::{
        recommendations_eq, status_eq, update_vpa_status_if_needed, StatusUpdate,
        UpdateVpaStatus,
    },
    vpa::{Vpa, VpaId, VpaWithSelector},
};
pub use vpa_controller_k8s_api as k8s;
