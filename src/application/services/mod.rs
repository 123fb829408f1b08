//! 应用服务

pub mod launch_service;

pub use launch_service::{INTERPRETER_ENV, LaunchOverrides, LaunchService};
