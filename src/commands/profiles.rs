//! profiles 命令处理器

use super::{CommandContext, CommandHandler};
use crate::application::services::LaunchService;
use crate::domain::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// profiles 命令
pub struct ProfilesCommand {
    launch_service: Arc<LaunchService>,
}

impl ProfilesCommand {
    pub fn new(launch_service: Arc<LaunchService>) -> Self {
        Self { launch_service }
    }
}

#[async_trait]
impl CommandHandler for ProfilesCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let profiles = self.launch_service.list().await?;

        for profile in &profiles {
            match (&profile.description, ctx.verbose) {
                (Some(desc), true) => println!("{}\t{}", profile.name, desc),
                _ => println!("{}", profile.name),
            }
        }

        if ctx.verbose {
            for source in self.launch_service.sources() {
                println!("# 来自 {}", source.display());
            }
        }

        Ok(0)
    }
}
