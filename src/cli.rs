//! CLI 参数定义

use crate::application::services::LaunchOverrides;
use crate::domain::models::DEFAULT_PROFILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// protolaunch - 小样本训练启动器
#[derive(Parser)]
#[command(
    name = "protolaunch",
    version,
    about = "小样本训练启动器",
    long_about = "组装训练命令行、注入 PYTHONPATH 并执行训练入口，透传其退出码"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 详细输出模式
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 指定配置文件（替代用户级与项目级配置）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行训练（默认配置档 omniglot_ccn）
    Launch {
        /// 配置档名称
        #[arg(default_value = DEFAULT_PROFILE)]
        profile: String,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// 只打印命令，不执行
        #[arg(long)]
        dry_run: bool,

        /// 追加到参数末尾的透传参数
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// 显示启动计划
    Show {
        /// 配置档名称
        #[arg(default_value = DEFAULT_PROFILE)]
        profile: String,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// 输出格式 (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// 追加到参数末尾的透传参数
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// 列出配置档
    Profiles,

    /// 诊断启动环境
    Doctor {
        /// 配置档名称
        #[arg(default_value = DEFAULT_PROFILE)]
        profile: String,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// 生成项目级配置文件
    Init {
        /// 覆盖已有文件
        #[arg(short, long)]
        force: bool,
    },
}

/// 单次运行的覆盖项
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// 解释器（优先于 PROTOLAUNCH_PYTHON）
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// 训练脚本路径
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// 覆盖参数值 (NAME=VALUE)
    #[arg(long = "set", value_name = "NAME=VALUE", allow_hyphen_values = true)]
    pub set: Vec<String>,

    /// 移除参数
    #[arg(long = "unset", value_name = "NAME", allow_hyphen_values = true)]
    pub unset: Vec<String>,

    /// 追加开关参数
    #[arg(long = "switch", value_name = "NAME", allow_hyphen_values = true)]
    pub switches: Vec<String>,

    /// 临时环境变量 (KEY=VALUE)
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// 子进程工作目录
    #[arg(short = 'C', long = "workdir", value_name = "DIR")]
    pub workdir: Option<PathBuf>,
}

impl OverrideArgs {
    /// 转换为服务层覆盖项
    pub fn into_overrides(self, extra: Vec<String>) -> LaunchOverrides {
        LaunchOverrides {
            interpreter: self.python,
            script: self.script,
            set: self.set,
            unset: self.unset,
            switches: self.switches,
            env: self.env,
            working_dir: self.workdir,
            extra,
        }
    }
}
