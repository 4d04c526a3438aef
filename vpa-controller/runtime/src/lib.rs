#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use vpa_controller_core as core;
pub use vpa_controller_k8s_api as k8s;
pub use vpa_controller_k8s_index as index;
pub use vpa_controller_k8s_status as status;

mod args;
mod lease;

pub use self::args::Args;
