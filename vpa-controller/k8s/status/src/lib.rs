#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod client;
mod controller;
mod metrics;
mod sync;


pub use self::{
    client::StatusClient,
    controller::Controller,
    metrics::ControllerMetrics,
    sync::{InitialSync, Synced},
};
use vpa_controller_core as core;
use vpa_controller_k8s_api as k8s;
use vpa_controller_k8s_index as index;
