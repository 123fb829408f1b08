//! protolaunch - 小样本训练启动器
//!
//! 组装训练入口的命令行（固定前缀 + 运行相关后缀），
//! 注入 `PYTHONPATH=.` 后执行解释器，并透传其退出码。

// 领域层
pub mod domain;

// 应用层
pub mod application;

// 基础设施层
pub mod infrastructure;

// 命令层
pub mod commands;

// CLI 定义
pub mod cli;

// 应用程序容器
pub mod app;

// 日志
pub mod logging;

// 重新导出常用类型
pub use domain::{DomainError, Flag, LaunchPlan, OutputFormat, Profile, Result};
