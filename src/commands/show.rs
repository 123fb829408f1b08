//! show 命令处理器

use super::{CommandContext, CommandHandler};
use crate::application::services::{LaunchOverrides, LaunchService};
use crate::domain::error::Result;
use crate::domain::models::OutputFormat;
use async_trait::async_trait;
use std::sync::Arc;

/// show 命令：输出启动计划，不执行
pub struct ShowCommand {
    launch_service: Arc<LaunchService>,
    profile: String,
    overrides: LaunchOverrides,
    format: OutputFormat,
}

impl ShowCommand {
    pub fn new(
        launch_service: Arc<LaunchService>,
        profile: String,
        overrides: LaunchOverrides,
        format: OutputFormat,
    ) -> Self {
        Self {
            launch_service,
            profile,
            overrides,
            format,
        }
    }
}

#[async_trait]
impl CommandHandler for ShowCommand {
    async fn execute(&self, _ctx: &CommandContext) -> Result<i32> {
        let plan = self
            .launch_service
            .resolve(&self.profile, &self.overrides)
            .await?;

        println!("{}", plan.render(self.format)?);
        Ok(0)
    }
}
