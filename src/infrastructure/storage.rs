//! 文件存储实现
//!
//! 配置文件为 TOML：
//!
//! ```toml
//! [profiles.omniglot_ccn]
//! interpreter = "python"
//! script = "scripts/train/few_shot/run_train.py"
//! prefix = ["--data.dataset", "omniglot_ccn", "--data.cuda"]
//! suffix = ["--log.exp_dir", "results/omniglot_ccn"]
//!
//! [profiles.omniglot_ccn.env]
//! PYTHONPATH = "."
//! ```

use crate::domain::error::{DomainError, Result};
use crate::domain::models::{Flag, Profile};
use crate::domain::repositories::{ProfileRepository, StorageConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 配置文件顶层结构
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
}

/// 单个配置档的文件表示
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub prefix: Vec<String>,
    #[serde(default)]
    pub suffix: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProfileEntry {
    fn into_profile(self, name: &str) -> Result<Profile> {
        let mut profile = Profile::new(name);
        profile.description = self.description;
        if let Some(interpreter) = self.interpreter {
            profile.interpreter = interpreter;
        }
        if let Some(script) = self.script {
            profile.script = script;
        }
        profile.prefix = Flag::parse_tokens(&self.prefix)
            .map_err(|e| DomainError::Config(format!("[profiles.{}] prefix: {}", name, e)))?;
        profile.suffix = Flag::parse_tokens(&self.suffix)
            .map_err(|e| DomainError::Config(format!("[profiles.{}] suffix: {}", name, e)))?;
        profile.env = self.env;
        // 重复参数等语义问题留到组装命令时报告，doctor 可以逐条列出
        Ok(profile)
    }

    fn from_profile(profile: &Profile) -> Self {
        Self {
            description: profile.description.clone(),
            interpreter: Some(profile.interpreter.clone()),
            script: Some(profile.script.clone()),
            prefix: profile.prefix.iter().flat_map(Flag::tokens).collect(),
            suffix: profile.suffix.iter().flat_map(Flag::tokens).collect(),
            env: profile.env.clone(),
        }
    }
}

/// 解析配置文件内容
pub fn parse_launch_file(content: &str, origin: &Path) -> Result<Vec<Profile>> {
    let file: LaunchFile = toml::from_str(content)
        .map_err(|e| DomainError::Config(format!("{}: {}", origin.display(), e)))?;

    file.profiles
        .into_iter()
        .map(|(name, entry)| entry.into_profile(&name))
        .collect()
}

/// 序列化为配置文件内容
pub fn render_launch_file(profiles: &[Profile]) -> Result<String> {
    let file = LaunchFile {
        profiles: profiles
            .iter()
            .map(|p| (p.name.clone(), ProfileEntry::from_profile(p)))
            .collect(),
    };

    let body = toml::to_string_pretty(&file)?;
    Ok(format!(
        "# protolaunch 配置文件\n# 同名配置档由后加载的文件整体覆盖\n\n{}",
        body
    ))
}

/// 文件配置档存储
pub struct FileProfileRepository {
    config: StorageConfig,
}

impl FileProfileRepository {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// 读取单个配置文件；不存在时返回 None
    async fn read_layer(&self, path: &Path) -> Result<Option<Vec<Profile>>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        log::debug!("加载配置文件 {}", path.display());
        parse_launch_file(&content, path).map(Some)
    }

    /// 按优先级合并所有层级
    async fn load_merged(&self) -> Result<BTreeMap<String, Profile>> {
        // 内置配置档优先级最低
        let builtin = Profile::builtin();
        let mut merged = BTreeMap::from([(builtin.name.clone(), builtin)]);

        if let Some(explicit) = &self.config.explicit_file {
            if !explicit.exists() {
                return Err(DomainError::FileNotFound(explicit.clone()));
            }
        }

        for path in self.config.layers() {
            if let Some(profiles) = self.read_layer(&path).await? {
                for profile in profiles {
                    if merged.contains_key(&profile.name) {
                        log::debug!("配置档 {} 被 {} 覆盖", profile.name, path.display());
                    }
                    merged.insert(profile.name.clone(), profile);
                }
            }
        }

        Ok(merged)
    }
}

#[async_trait]
impl ProfileRepository for FileProfileRepository {
    async fn get(&self, name: &str) -> Result<Option<Profile>> {
        Ok(self.load_merged().await?.remove(name))
    }

    async fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.load_merged().await?.into_values().collect())
    }

    fn sources(&self) -> Vec<PathBuf> {
        self.config
            .layers()
            .into_iter()
            .filter(|p| p.exists())
            .collect()
    }
}
