//! # qx2adguard
//!
//! 把 QuantumultX 风格的 reject 规则转换为 AdGuard / hosts 可用的拦截列表。
//!
//! ## 功能
//! - 从规则源列表读取规则源（远程 URL、本地文件、行内规则）
//! - 逐行分类并翻译：
//!   - `host, d, reject` → `0.0.0.0 d`
//!   - `host-suffix, d, reject` → `0.0.0.0 d` + `||d^`
//!   - `host-keyword, k, reject` → `||*k*$important`
//!   - `url, [scheme://]h/path, reject` → `||h/path^`
//! - 去重、白名单过滤、统计
//! - 原子写入输出文件
//!
//! ## 使用
//! ```bash
//! # 默认读取 rules.txt，输出 adguard-rules.txt
//! qx2adguard
//!
//! # 只预览，不写文件
//! qx2adguard --dry-run
//!
//! # 使用白名单，host-suffix 额外输出 IPv6 hosts 行
//! qx2adguard -w whitelist.txt --suffix-marker ipv6
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

mod error;
mod merge;
mod pipeline;
mod reporter;
mod rule;
mod source;
mod writer;

use merge::Report;
use pipeline::ConvertConfig;
use reporter::LogReporter;
use rule::{ClassifyMode, SuffixMarker};
use source::{load_source_list, HttpFetcher};

// ========================================
// CLI 参数定义
// ========================================

/// QuantumultX → AdGuard 规则转换工具
#[derive(Parser, Debug)]
#[command(name = "qx2adguard")]
#[command(version)]
#[command(about = "Convert QuantumultX reject rules into AdGuard / hosts blocklists")]
struct Cli {
    /// 规则源列表文件（每行一个 URL、本地文件或规则）
    #[arg(long, short = 'r', default_value = "rules.txt", env = "QX2ADGUARD_RULES_FILE")]
    rules_file: PathBuf,

    /// 输出文件
    #[arg(long, short = 'o', default_value = "adguard-rules.txt", env = "QX2ADGUARD_OUTPUT")]
    output: PathBuf,

    /// 网络请求超时（秒）
    #[arg(long, short = 't', default_value_t = 20, env = "QX2ADGUARD_TIMEOUT")]
    timeout: u64,

    /// 拉取失败后的重试次数
    #[arg(long, default_value_t = 2, env = "QX2ADGUARD_RETRIES")]
    retries: usize,

    /// 非语法行的处理模式
    #[arg(long, value_enum, default_value_t = ClassifyMode::Strict, env = "QX2ADGUARD_MODE")]
    mode: ClassifyMode,

    /// host-suffix 规则的第二行形式
    #[arg(long, value_enum, default_value_t = SuffixMarker::Adguard, env = "QX2ADGUARD_SUFFIX_MARKER")]
    suffix_marker: SuffixMarker,

    /// 白名单文件（可选）
    #[arg(long, short = 'w', value_name = "PATH", env = "QX2ADGUARD_WHITELIST")]
    whitelist: Option<PathBuf>,

    /// 执行完整流程但不写文件，只打印预览
    #[arg(long)]
    dry_run: bool,

    /// dry-run 时预览的行数
    #[arg(long, default_value_t = 20)]
    preview: usize,

    /// 以 JSON 格式输出统计
    #[arg(long)]
    json: bool,

    /// 显示调试信息（等同于 -vv）
    #[arg(long)]
    debug: bool,

    /// 日志详细程度（-v info, -vv debug, -vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_config(&self) -> ConvertConfig {
        ConvertConfig {
            rules_file: self.rules_file.clone(),
            output: self.output.clone(),
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
            mode: self.mode,
            suffix_marker: self.suffix_marker,
            whitelist: self.whitelist.clone(),
            dry_run: self.dry_run,
            preview: self.preview,
        }
    }

    /// 根据 --debug / -v 初始化日志，RUST_LOG 优先
    fn init_logging(&self) {
        let level = match (self.debug, self.verbose) {
            (true, v) if v < 3 => "debug",
            (_, 0) | (_, 1) => "info",
            (_, 2) => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_target(false)
            .init();
    }
}

// ========================================
// 主函数
// ========================================

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    if let Err(e) = run_convert(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// 执行转换
fn run_convert(cli: &Cli) -> Result<()> {
    let config = cli.to_config();
    log::debug!("config: {:?}", config);

    // 1. 读取规则源列表（缺失或为空直接退出）
    let sources = load_source_list(&config.rules_file)?;
    log::info!(
        "loaded {} sources from {}",
        sources.len(),
        config.rules_file.display()
    );
    for source in &sources {
        log::debug!("source: {}", source);
    }

    // 2. 加载 + 转换 + 合并
    let fetcher = HttpFetcher::new(config.timeout)?;
    let mut reporter = LogReporter;
    let doc = pipeline::build_document(&config, &sources, &fetcher, &mut reporter)?;

    // 3. 无论后续成败都输出摘要
    print_summary(&doc.report, cli.json)?;
    pipeline::check_document(&doc)?;

    // 4. dry-run 只打印预览
    if config.dry_run {
        let preview = pipeline::preview(&doc, config.preview);
        log::info!(
            "dry-run enabled; not writing output. First {} lines:",
            preview.len()
        );
        for (i, line) in preview.iter().enumerate() {
            // JSON 模式下 stdout 只保留摘要
            if cli.json {
                log::info!("{:>3}: {}", i + 1, line);
            } else {
                println!("{:>3}: {}", i + 1, line);
            }
        }
        return Ok(());
    }

    // 5. 原子写入
    let size = writer::write_atomic(&config.output, doc.lines())
        .context("output left unchanged")?;
    log::info!(
        "successfully wrote {} rules ({} bytes) to {}",
        doc.report.emitted,
        size,
        config.output.display()
    );

    Ok(())
}

/// 打印运行摘要
fn print_summary(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
