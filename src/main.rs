use anyhow::Result;
use tracing::info;

use lsr_classify::models::load_prompt;
use lsr_classify::oneshot;
use lsr_classify::utils::logging;
use lsr_classify::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（校验由各入口各自负责）
    let config = Config::load()?;

    // `--once <remark>`：单发分类，无重试 / 无断点续传
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(|a| a.as_str()) == Some("--once") {
        config.validate()?;
        let remark = args[1..].join(" ");
        let prompt = load_prompt(&config.prompt_file).await?;
        let result = oneshot::classify_once(&remark, &prompt, &config).await?;
        info!("概率: {:?}", result.probabilities);
        info!("FFSI 分值: {:.2}", result.ffsi_score);
        if !result.extra.is_empty() {
            info!("附加说明: {}", result.extra);
        }
        return Ok(());
    }

    // 批处理管线
    App::initialize(config)?.run().await?;

    Ok(())
}
