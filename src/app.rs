//! 应用程序容器
//!
//! 负责依赖注入和生命周期管理

use crate::application::services::{INTERPRETER_ENV, LaunchService};
use crate::domain::repositories::{ProfileRepository, StorageConfig};
use crate::infrastructure::storage::FileProfileRepository;
use std::path::PathBuf;
use std::sync::Arc;

/// 应用程序配置
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    /// 来自 PROTOLAUNCH_PYTHON 的解释器
    pub interpreter: Option<String>,
}

impl AppConfig {
    /// 从命令行与进程环境构建
    pub fn from_env(config_file: Option<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                explicit_file: config_file,
                ..StorageConfig::default()
            },
            interpreter: std::env::var(INTERPRETER_ENV).ok(),
        }
    }
}

/// 应用程序容器
pub struct Application {
    /// 启动服务
    pub launch_service: Arc<LaunchService>,
}

impl Application {
    /// 创建应用程序实例
    pub fn new(config: AppConfig) -> Self {
        let repo: Arc<dyn ProfileRepository> =
            Arc::new(FileProfileRepository::new(config.storage.clone()));

        let launch_service = Arc::new(LaunchService::new(repo, config.interpreter));
        Self { launch_service }
    }
}
