//! 领域层错误类型

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomainError>;

/// 领域层错误类型
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum DomainError {
    #[error("配置档未找到: {0}")]
    #[diagnostic(
        code(protolaunch::profile_not_found),
        help("使用 'protolaunch profiles' 查看所有配置档")
    )]
    ProfileNotFound(String),

    #[error("参数未找到: {0}")]
    #[diagnostic(code(protolaunch::flag_not_found))]
    NotFound(String),

    #[error("参数重复: --{0}")]
    #[diagnostic(
        code(protolaunch::duplicate_flag),
        help("同一参数在前缀和后缀中只能出现一次")
    )]
    DuplicateFlag(String),

    #[error("IO 错误: {0}")]
    #[diagnostic(code(protolaunch::io))]
    Io(String),

    #[error("权限不足: {0}")]
    #[diagnostic(code(protolaunch::permission_denied), help("检查文件权限"))]
    PermissionDenied(String),

    #[error("文件不存在: {0}")]
    #[diagnostic(code(protolaunch::file_not_found))]
    FileNotFound(PathBuf),

    #[error("解析错误: {0}")]
    #[diagnostic(code(protolaunch::parse))]
    Parse(String),

    #[error("序列化错误: {0}")]
    #[diagnostic(code(protolaunch::serialization))]
    Serialization(String),

    #[error("环境变量解析错误: {0}")]
    #[diagnostic(code(protolaunch::env_parse), help("格式应为 KEY=VALUE"))]
    EnvParse(String),

    #[error("命令未找到: {0}")]
    #[diagnostic(
        code(protolaunch::command_not_found),
        help("确保解释器在 PATH 中，或使用 --python 指定完整路径")
    )]
    CommandNotFound(String),

    #[error("命令执行失败: {0}")]
    #[diagnostic(code(protolaunch::command_execution))]
    CommandExecutionFailed(String),

    #[error("无效参数: {0}")]
    #[diagnostic(code(protolaunch::invalid_argument))]
    InvalidArgument(String),

    #[error("配置错误: {0}")]
    #[diagnostic(code(protolaunch::config))]
    Config(String),
}

impl DomainError {
    /// 报告错误，支持详细/安静模式
    /// verbose = true: 错误码 + 帮助信息
    /// verbose = false: 仅一行关键信息
    pub fn report(&self, verbose: bool) {
        if verbose {
            eprintln!("❌ 错误: {}", self);
            if let Some(code) = self.code() {
                eprintln!("  └─ 代码: {}", code);
            }
            if let Some(help) = self.help() {
                eprintln!("  └─ 提示: {}", help);
            }
        } else {
            eprintln!("错误: {}", self);
        }
    }

    /// 启动器自身失败时的进程退出码
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            DomainError::CommandNotFound(_) => 127,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => DomainError::PermissionDenied(err.to_string()),
            _ => DomainError::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DomainError::CommandNotFound("python".into()).exit_code(), 127);
        assert_eq!(DomainError::Config("bad".into()).exit_code(), 1);
    }

    #[test]
    fn test_io_permission_mapping() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(DomainError::from(err), DomainError::PermissionDenied(_)));

        let err = std::io::Error::other("boom");
        assert!(matches!(DomainError::from(err), DomainError::Io(_)));
    }
}
