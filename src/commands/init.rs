//! init 命令处理器

use super::{CommandContext, CommandHandler};
use crate::domain::error::{DomainError, Result};
use crate::domain::models::Profile;
use crate::infrastructure::{paths, storage};
use async_trait::async_trait;
use std::path::PathBuf;

/// init 命令：写出可编辑的项目级配置文件
pub struct InitCommand {
    target: PathBuf,
    force: bool,
}

impl InitCommand {
    pub fn new(target: PathBuf, force: bool) -> Self {
        Self { target, force }
    }
}

#[async_trait]
impl CommandHandler for InitCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        if self.target.exists() && !self.force {
            return Err(DomainError::Config(format!(
                "{} 已存在，使用 --force 覆盖",
                self.target.display()
            )));
        }

        paths::ensure_parent_dir(&self.target).await?;
        let content = storage::render_launch_file(&[Profile::builtin()])?;
        tokio::fs::write(&self.target, content).await?;

        if ctx.verbose {
            println!("✓ 配置文件: {}", self.target.display());
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::parse_launch_file;

    #[tokio::test]
    async fn test_init_writes_builtin_profile() {
        let dir = tempfile::tempdir().unwrap();
        let target = paths::project_config_file(dir.path());
        let ctx = CommandContext { verbose: false };

        let code = InitCommand::new(target.clone(), false).execute(&ctx).await.unwrap();
        assert_eq!(code, 0);

        let content = std::fs::read_to_string(&target).unwrap();
        let profiles = parse_launch_file(&content, &target).unwrap();
        assert_eq!(profiles, vec![Profile::builtin()]);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("launch.toml");
        std::fs::write(&target, "# mine\n").unwrap();
        let ctx = CommandContext { verbose: false };

        let result = InitCommand::new(target.clone(), false).execute(&ctx).await;
        assert!(matches!(result, Err(DomainError::Config(_))));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# mine\n");

        InitCommand::new(target.clone(), true).execute(&ctx).await.unwrap();
        assert!(std::fs::read_to_string(&target).unwrap().contains("omniglot_ccn"));
    }
}
