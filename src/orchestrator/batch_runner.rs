//! 批处理驱动 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个管线的顶层驱动，负责批次推进和故障决策。
//!
//! ## 核心流程
//!
//! 1. **加载状态**：运行开始时从结果存储读取全部有效结果
//! 2. **划分批次**：把记录序列按固定大小切批（保持原始顺序）
//! 3. **逐批推进**：每批先用断点续传协调器过滤掉已完成的记录，
//!    整批已完成则直接跳过
//! 4. **逐条分类**：串行调用分类服务（同一时刻最多一个在途请求），
//!    每条结果**立即**落盘并更新内存状态，而不是攒到批末——
//!    中途被杀最多丢失一条在途记录
//! 5. **故障决策**：临时故障 / 响应格式错误按配置重试，用尽后该记录
//!    留待下次运行；致命故障立即中止整个运行，已保存结果不受影响
//!
//! 单条记录的状态流转只有：PENDING → IN_FLIGHT →
//! {DONE | RETRY | SKIPPED_FOR_NOW} → 下一条。

use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, ClassifyFailure};
use crate::models::batch::{split_batches, Batch};
use crate::models::loaders::{load_ibw_lsrs, load_prompt};
use crate::models::record::LsrRecord;
use crate::models::result::JobState;
use crate::orchestrator::resume;
use crate::services::llm_service::{Classifier, ClassifyOutcome, LlmService};
use crate::services::report_writer::write_report;
use crate::services::result_store::ResultStore;
use crate::utils::logging::truncate_text;

/// 一次运行的统计
#[derive(Debug, Default)]
pub struct RunStats {
    pub total_records: usize,
    pub total_batches: usize,
    pub batches_processed: usize,
    pub batches_skipped: usize,
    /// 本次运行新分类成功的记录数
    pub classified: usize,
    /// 运行开始前就已有有效结果的记录数
    pub already_done: usize,
    /// remark 为空、无法分类的记录数
    pub empty: usize,
    /// 重试用尽仍失败、留待下次运行的记录数
    pub failed: usize,
}

/// 批处理驱动
///
/// 对分类能力只依赖 [`Classifier`] 接口，生产环境注入
/// [`LlmService`]，管线测试注入脚本化实现。
pub struct BatchRunner<C> {
    config: Config,
    store: ResultStore,
    client: C,
}

impl<C: Classifier> BatchRunner<C> {
    pub fn new(config: Config, store: ResultStore, client: C) -> Self {
        Self {
            config,
            store,
            client,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// 运行批处理管线
    ///
    /// 正常结束返回统计；致命故障返回错误，此前保存的结果全部保留。
    pub async fn run(&mut self, records: Vec<LsrRecord>, prompt: &str) -> AppResult<RunStats> {
        let mut state = self.store.load()?;

        let batches = split_batches(records, self.config.batch_size)?;
        let mut stats = RunStats {
            total_records: batches.iter().map(|b| b.records.len()).sum(),
            total_batches: batches.len(),
            ..Default::default()
        };

        info!(
            "处理 {} 条 LSR / {} 个批次",
            stats.total_records, stats.total_batches
        );

        for batch in &batches {
            if self.config.max_batches > 0 && batch.index >= self.config.max_batches {
                warn!(
                    "⚠️ 已达到 max_batches = {} 上限，提前停止",
                    self.config.max_batches
                );
                break;
            }

            let pending = resume::outstanding(&batch.records, &state);
            stats.already_done += batch.records.len() - pending.len();

            if pending.is_empty() {
                stats.batches_skipped += 1;
                info!(
                    "⚠️ 跳过批次 {}/{} - 已全部处理",
                    batch.index + 1,
                    stats.total_batches
                );
                continue;
            }

            log_batch_start(batch, stats.total_batches, pending.len());

            for record in pending {
                self.process_record(record, prompt, &mut state, &mut stats)
                    .await?;
            }

            stats.batches_processed += 1;
            log_batch_complete(batch.index + 1, &stats);
        }

        Ok(stats)
    }

    /// 处理单条记录：分类 → 立即落盘；有界重试；致命故障向上传播
    async fn process_record(
        &mut self,
        record: &LsrRecord,
        prompt: &str,
        state: &mut JobState,
        stats: &mut RunStats,
    ) -> AppResult<()> {
        let mut attempts: u32 = 0;

        loop {
            match self.client.classify(&record.id, record.remark(), prompt).await {
                Ok(ClassifyOutcome::Classified(result)) => {
                    // 先落盘再推进：下一条请求开始前结果已持久化
                    self.store.save(&result)?;
                    info!(
                        "✓ [行 {}] 分类完成 (FFSI {:.2}): {}",
                        record.row,
                        result.ffsi_score,
                        truncate_text(record.remark(), 60)
                    );
                    state.insert(result.record_id.clone(), result);
                    stats.classified += 1;
                    return Ok(());
                }
                Ok(ClassifyOutcome::EmptyRemark) => {
                    warn!("⚠️ [行 {}] remark 为空，无法分类", record.row);
                    stats.empty += 1;
                    return Ok(());
                }
                Err(failure) if !failure.is_retryable() => {
                    error!("❌ [行 {}] {}，中止运行", record.row, failure);
                    return Err(failure.into());
                }
                Err(failure) => {
                    // 响应格式错误单独记录：这是请求/响应约定被破坏，
                    // 而不是连接问题
                    match &failure {
                        ClassifyFailure::Malformed { reason, raw } => {
                            warn!(
                                "⚠️ [行 {}] 响应格式错误: {}；原始响应: {}",
                                record.row,
                                reason,
                                truncate_text(raw, 120)
                            );
                        }
                        _ => {
                            warn!("⚠️ [行 {}] {}", record.row, failure);
                        }
                    }

                    attempts += 1;
                    if attempts > self.config.max_retries {
                        warn!(
                            "⚠️ [行 {}] 重试 {} 次后放弃，留待下次运行",
                            record.row, self.config.max_retries
                        );
                        stats.failed += 1;
                        return Ok(());
                    }
                    info!(
                        "🔁 [行 {}] 重试 {}/{}",
                        record.row, attempts, self.config.max_retries
                    );
                }
            }
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    runner: BatchRunner<LlmService>,
}

impl App {
    /// 初始化应用：校验配置、解析密钥、打开结果存储
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config);

        let api_key = config.resolve_api_key()?;
        let client = LlmService::new(&config, api_key);
        let store = ResultStore::new(&config.results_dir)?;

        Ok(Self {
            runner: BatchRunner::new(config.clone(), store, client),
            config,
        })
    }

    /// 运行应用主逻辑：加载 → 批处理 → 汇总报告
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let prompt = load_prompt(&self.config.prompt_file).await?;
        let records = load_ibw_lsrs(&self.config.lsr_file)?;

        if records.is_empty() {
            warn!("⚠️ LSR 文件中没有记录，程序结束");
            return Ok(());
        }

        let stats = self.runner.run(records.clone(), &prompt).await?;
        print_final_stats(&stats, &self.config);

        // 汇总报告：重新加载一次存储，拿到包含历史运行在内的全部有效结果
        let state = self.runner.store().load()?;
        let report_path = Path::new(&self.config.results_dir).join("classified.csv");
        write_report(&records, &state, &self.config.categories, &report_path)?;

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - LSR 批量分类模式");
    info!("📦 批次大小: {} / 请求间隔: {:.1} 秒 / 最大重试: {}",
        config.batch_size, config.request_delay_secs, config.max_retries);
    info!("📁 结果目录: {}", config.results_dir);
    info!("{}", "=".repeat(60));
}

fn log_batch_start(batch: &Batch, total_batches: usize, pending: usize) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 开始处理批次 {}/{}：{} 条待分类 / 共 {} 条",
        batch.index + 1,
        total_batches,
        pending,
        batch.records.len()
    );
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, stats: &RunStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批次 {} 完成（累计分类 {} 条，失败 {} 条）",
        batch_num, stats.classified, stats.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &RunStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本次运行统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 新分类: {} / 共 {} 条记录", stats.classified, stats.total_records);
    info!("⏭️ 此前已完成: {}", stats.already_done);
    info!("⚠️ 空 remark: {} / 留待下次: {}", stats.empty, stats.failed);
    info!(
        "📦 批次: 处理 {} / 跳过 {} / 共 {}",
        stats.batches_processed, stats.batches_skipped, stats.total_batches
    );
    info!("📁 结果目录: {}", config.results_dir);
    info!("{}", "=".repeat(60));
}
