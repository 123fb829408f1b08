//! Infrastructure Layer - 技术实现
//!
//! 包含：
//! - storage: TOML 配置档存储
//! - executor: 子进程执行
//! - paths: 路径工具

pub mod executor;
pub mod paths;
pub mod storage;

pub use executor::CommandExecutor;
pub use storage::FileProfileRepository;
