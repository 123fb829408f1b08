//! 命令处理器
//!
//! 每个命令一个模块，实现 CommandHandler trait

use crate::domain::error::Result;
use async_trait::async_trait;

pub mod doctor;
pub mod init;
pub mod launch;
pub mod profiles;
pub mod show;

/// 命令上下文
#[derive(Debug)]
pub struct CommandContext {
    pub verbose: bool,
}

/// 命令处理器 trait
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// 执行命令，返回进程退出码
    async fn execute(&self, ctx: &CommandContext) -> Result<i32>;
}
