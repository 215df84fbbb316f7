// ==========================================
// 商品目录导入系统 - 命令行主入口
// ==========================================
// 命令:
// - catalog-import import-categories <path>
// - catalog-import import-products <path>
// - catalog-import list-products
// - catalog-import config get|set|list
// 退出码: 成功 0，失败 1
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use catalog_import::api::{ApiError, ImportApi};
use catalog_import::app::{get_default_db_path, AppState};
use catalog_import::domain::types::EntityKind;
use catalog_import::i18n::{set_locale, t_with_args};
use catalog_import::logging;
use clap::{Parser, Subcommand};

/// 商品目录 JSON 批量导入
#[derive(Parser, Debug)]
#[command(name = "catalog-import")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 数据库文件路径（默认: CATALOG_IMPORT_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// 界面语言（zh-CN / en）
    #[arg(long, global = true, default_value = "zh-CN")]
    lang: String,

    /// 导入超时（秒），0 表示不限
    #[arg(long, global = true, default_value_t = 0)]
    timeout_secs: u64,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 日志输出为 JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入类目 JSON 文件
    ImportCategories {
        /// JSON 文件路径
        path: PathBuf,
    },

    /// 导入商品 JSON 文件
    ImportProducts {
        /// JSON 文件路径
        path: PathBuf,
    },

    /// 列出全部商品
    ListProducts,

    /// 读写 config_kv 配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 读取配置值
    Get { key: String },

    /// 写入配置值
    Set { key: String, value: String },

    /// 列出全部配置
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(if cli.verbose { "debug" } else { "warn" }, cli.log_json);
    set_locale(&cli.lang);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::info!(db_path = %db_path, version = catalog_import::VERSION, "启动");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::ImportCategories { path } => {
            Ok(run_import(&state, EntityKind::Category, path, cli.timeout_secs).await)
        }
        Command::ImportProducts { path } => {
            Ok(run_import(&state, EntityKind::Product, path, cli.timeout_secs).await)
        }
        Command::ListProducts => {
            let products = state.product_api.list_all()?;
            println!("{}", serde_json::to_string_pretty(&products)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => run_config(&state, action),
    }
}

/// 在阻塞线程上执行导入，可选超时
///
/// 超时只影响等待：已开始持久化的导入会继续执行到结束
async fn run_import(state: &AppState, kind: EntityKind, path: PathBuf, timeout_secs: u64) -> ExitCode {
    let import_api: Arc<ImportApi> = state.import_api.clone();
    let handle = tokio::task::spawn_blocking(move || import_api.import(kind, &path));

    let joined = if timeout_secs > 0 {
        match tokio::time::timeout(Duration::from_secs(timeout_secs), handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(kind = %kind, timeout_secs, "导入超时");
                eprintln!(
                    "{}",
                    t_with_args("import.timeout", &[("secs", &timeout_secs.to_string())])
                );
                return ExitCode::FAILURE;
            }
        }
    } else {
        handle.await
    };

    let outcome = joined.unwrap_or_else(|e| Err(ApiError::InternalError(format!("导入任务异常: {}", e))));

    match outcome {
        Ok(response) => {
            println!("{}", response.message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "导入失败");
            eprintln!("{}", ImportApi::render_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run_config(state: &AppState, action: ConfigAction) -> anyhow::Result<ExitCode> {
    match action {
        ConfigAction::Get { key } => {
            let value = state
                .config
                .get_config_value(&key)
                .with_context(|| format!("读取配置失败: {}", key))?;
            match value {
                Some(value) => {
                    println!("{}", t_with_args("config.value", &[("key", &key), ("value", &value)]));
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        ConfigAction::Set { key, value } => {
            state
                .config
                .set_config_value(&key, &value)
                .with_context(|| format!("写入配置失败: {}", key))?;
            println!("{}", t_with_args("config.updated", &[("key", &key), ("value", &value)]));
            Ok(ExitCode::SUCCESS)
        }
        ConfigAction::List => {
            for (key, value) in state.config.list_config()? {
                println!("{}", t_with_args("config.value", &[("key", &key), ("value", &value)]));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
