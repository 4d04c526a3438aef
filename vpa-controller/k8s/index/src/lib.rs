#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
mod workload;


pub use self::{
    index::{DesiredStatus, Index, SharedIndex},
    workload::TargetError,
};
pub use vpa_controller_core as core;
pub use vpa_controller_k8s_api as k8s;
