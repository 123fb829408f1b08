//! 存储接口定义（输出端口）

use crate::domain::error::Result;
use crate::domain::models::Profile;
use async_trait::async_trait;
use std::path::PathBuf;

/// 配置档存储接口
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// 按名称获取配置档（按层级合并）
    async fn get(&self, name: &str) -> Result<Option<Profile>>;

    /// 列出全部配置档，按名称排序
    async fn list(&self) -> Result<Vec<Profile>>;

    /// 实际参与合并的配置文件
    fn sources(&self) -> Vec<PathBuf>;
}

/// 存储配置
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub user_file: Option<PathBuf>,
    pub project_file: PathBuf,
    /// 显式指定的配置文件，替代用户级与项目级
    pub explicit_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            user_file: dirs::home_dir().map(|h| h.join(".protolaunch").join("launch.toml")),
            project_file: PathBuf::from(".protolaunch").join("launch.toml"),
            explicit_file: None,
        }
    }
}

impl StorageConfig {
    /// 按优先级从低到高排列的配置文件
    #[must_use]
    pub fn layers(&self) -> Vec<PathBuf> {
        if let Some(file) = &self.explicit_file {
            return vec![file.clone()];
        }
        self.user_file
            .iter()
            .cloned()
            .chain(std::iter::once(self.project_file.clone()))
            .collect()
    }
}
