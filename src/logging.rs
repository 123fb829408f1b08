//! 日志初始化
//!
//! 默认只输出警告，成功时保持安静；`--verbose` 打开 debug，
//! `RUST_LOG` 优先于两者。

use env_logger::Env;

pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    // 测试中可能重复初始化，忽略错误
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
