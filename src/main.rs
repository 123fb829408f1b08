//! protolaunch 主程序入口
//!
//! 设计原则：
//! - 入口代码简洁，逻辑委托给各命令处理器
//! - 安静模式：默认无输出，成功静默
//! - 退出码：训练进程的退出码原样透传

use clap::Parser;
use protolaunch::app::{AppConfig, Application};
use protolaunch::cli::{Cli, Commands};
use protolaunch::commands::doctor::DoctorCommand;
use protolaunch::commands::init::InitCommand;
use protolaunch::commands::launch::LaunchCommand;
use protolaunch::commands::profiles::ProfilesCommand;
use protolaunch::commands::show::ShowCommand;
use protolaunch::commands::{CommandContext, CommandHandler};
use protolaunch::infrastructure::paths;
use protolaunch::{OutputFormat, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = AppConfig::from_env(cli.config.clone());
    let app = Application::new(config);
    let ctx = CommandContext {
        verbose: cli.verbose,
    };

    let handler = build_handler(cli.command, &app);

    let code = match handler.execute(&ctx).await {
        Ok(code) => code,
        Err(e) => {
            e.report(ctx.verbose);
            e.exit_code()
        }
    };

    std::process::exit(code);
}

/// 构建命令处理器
fn build_handler(command: Commands, app: &Application) -> Box<dyn CommandHandler> {
    let service = app.launch_service.clone();

    match command {
        Commands::Launch {
            profile,
            overrides,
            dry_run,
            extra,
        } => Box::new(LaunchCommand::new(
            service,
            profile,
            overrides.into_overrides(extra),
            dry_run,
        )),

        Commands::Show {
            profile,
            overrides,
            format,
            extra,
        } => Box::new(ShowCommand::new(
            service,
            profile,
            overrides.into_overrides(extra),
            OutputFormat::from(format.as_str()),
        )),

        Commands::Profiles => Box::new(ProfilesCommand::new(service)),

        Commands::Doctor { profile, overrides } => Box::new(DoctorCommand::new(
            service,
            profile,
            overrides.into_overrides(Vec::new()),
        )),

        Commands::Init { force } => Box::new(InitCommand::new(
            paths::project_config_file(std::path::Path::new(".")),
            force,
        )),
    }
}
