use anyhow::Result;
use clap::Parser;
use ocr_eval_dashboard::utils::logging;
use ocr_eval_dashboard::{App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let cli = Cli::parse();

    config.validate()?;

    // 初始化并运行应用
    App::initialize(config).await?.run(cli.cmd).await?;

    Ok(())
}
