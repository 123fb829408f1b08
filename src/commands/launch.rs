//! launch 命令处理器

use super::{CommandContext, CommandHandler};
use crate::application::services::{LaunchOverrides, LaunchService};
use crate::domain::error::Result;
use crate::infrastructure::CommandExecutor;
use async_trait::async_trait;
use std::sync::Arc;

/// launch 命令
pub struct LaunchCommand {
    launch_service: Arc<LaunchService>,
    profile: String,
    overrides: LaunchOverrides,
    dry_run: bool,
}

impl LaunchCommand {
    pub fn new(
        launch_service: Arc<LaunchService>,
        profile: String,
        overrides: LaunchOverrides,
        dry_run: bool,
    ) -> Self {
        Self {
            launch_service,
            profile,
            overrides,
            dry_run,
        }
    }
}

#[async_trait]
impl CommandHandler for LaunchCommand {
    async fn execute(&self, _ctx: &CommandContext) -> Result<i32> {
        let plan = self
            .launch_service
            .resolve(&self.profile, &self.overrides)
            .await?;

        if self.dry_run {
            println!("{}", plan);
            return Ok(0);
        }

        // 退出码透传
        let code = CommandExecutor::run(&plan).await?;
        if code != 0 {
            log::warn!("训练进程退出码 {}", code);
        }
        Ok(code)
    }
}
