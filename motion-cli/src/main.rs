//! # Motion CLI
//!
//! 卡片动画时间轴模拟工具：以固定帧间隔驱动 `PhaseCoordinator`，输出阶段变化。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p motion-cli -- select seo --cards web,brand,seo,support
//! cargo run -p motion-cli -- select seo --cards web,brand,seo --json
//! cargo run -p motion-cli -- round-trip seo --cards web,brand,seo --tick 50
//! cargo run -p motion-cli -- --config timeline.json select seo --cards web,seo
//! cargo run -p motion-cli -- check timeline.json
//! cargo run -p motion-cli -- init --output timeline.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use card_motion::{CoordinatorEvent, PhaseCoordinator, TimelineConfig};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 模拟步数上限，防止配置异常时无限推进
const MAX_STEPS: usize = 100_000;

#[derive(Parser)]
#[command(name = "motion")]
#[command(about = "卡片动画时间轴模拟工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 时间轴配置文件（JSON），缺省使用默认时间轴
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 帧间隔（毫秒）
    #[arg(short, long, default_value = "16", global = true)]
    tick: u64,

    /// 输出 debug 日志（设置了 RUST_LOG 时以 RUST_LOG 为准）
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 模拟一次选择过渡
    Select {
        /// 被选中的卡片
        card: String,

        /// 卡片集合（逗号分隔，按网格顺序）
        #[arg(long, value_delimiter = ',', required = true)]
        cards: Vec<String>,

        /// 结束时以 JSON 输出快照
        #[arg(long)]
        json: bool,
    },

    /// 模拟选择完成后再取消选择，回到初始状态
    RoundTrip {
        card: String,

        #[arg(long, value_delimiter = ',', required = true)]
        cards: Vec<String>,
    },

    /// 检查时间轴配置文件
    Check {
        /// 配置文件路径
        file: PathBuf,
    },

    /// 写出默认时间轴配置
    Init {
        /// 输出路径
        #[arg(short, long, default_value = "timeline.json")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = real_main(cli) {
        eprintln!("motion error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let tick = Duration::from_millis(cli.tick.max(1));
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Select { card, cards, json } => {
            let mut coordinator = PhaseCoordinator::with_config(config);
            coordinator.select_card(&card, &cards)?;
            print_cards(&coordinator);
            print_trace(&simulate(&mut coordinator, tick));

            if json {
                println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
            }
        }
        Commands::RoundTrip { card, cards } => {
            let mut coordinator = PhaseCoordinator::with_config(config);
            let initial = coordinator.snapshot();

            coordinator.select_card(&card, &cards)?;
            print_trace(&simulate(&mut coordinator, tick));

            coordinator.deselect_card(&card, &cards)?;
            print_cards(&coordinator);
            print_trace(&simulate(&mut coordinator, tick));

            if coordinator.snapshot() != initial {
                anyhow::bail!("往返后状态与初始状态不一致");
            }
            println!("round trip ok ({}ms)", coordinator.now().as_millis());
        }
        Commands::Check { file } => {
            if !file.exists() {
                anyhow::bail!("配置文件不存在: {}", file.display());
            }
            let config = TimelineConfig::load(&file)?;
            println!("{} ok", file.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Init { output } => {
            TimelineConfig::default().save(&output)?;
            info!(path = %output.display(), "已写出默认时间轴配置");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TimelineConfig> {
    match path {
        Some(path) => Ok(TimelineConfig::load(path)?),
        None => Ok(TimelineConfig::default()),
    }
}

/// 一条时间轴记录
#[derive(Debug, Clone, PartialEq)]
struct TraceLine {
    /// 相对于模拟开始的时刻
    at: Duration,
    event: CoordinatorEvent,
}

/// 以固定帧间隔推进，直到过渡结束
///
/// 帧内到期的动作按到期时刻单独推进，记录的时刻与帧间隔无关。
fn simulate(coordinator: &mut PhaseCoordinator, tick: Duration) -> Vec<TraceLine> {
    let start = coordinator.now();
    let mut lines = Vec::new();

    drain_into(coordinator, start, &mut lines);
    for _ in 0..MAX_STEPS {
        let mut remaining = tick;
        while let Some(due) = coordinator.next_deadline().filter(|due| *due <= remaining) {
            coordinator.advance(due);
            drain_into(coordinator, start, &mut lines);
            remaining -= due;
        }

        let animating = coordinator.advance(remaining);
        drain_into(coordinator, start, &mut lines);
        if !animating && coordinator.next_deadline().is_none() {
            break;
        }
    }

    debug!(events = lines.len(), "模拟结束");
    lines
}

/// 取出事件并以相对时刻记录
fn drain_into(coordinator: &mut PhaseCoordinator, start: Duration, lines: &mut Vec<TraceLine>) {
    let at = coordinator.now().saturating_sub(start);
    lines.extend(
        coordinator
            .drain_events()
            .into_iter()
            .map(|event| TraceLine { at, event }),
    );
}

fn print_cards(coordinator: &PhaseCoordinator) {
    for card in coordinator.card_states().iter() {
        println!(
            "  {:<24} {:<9} delay {:>4}ms",
            card.identifier,
            card.sub_phase,
            card.exit_delay.as_millis()
        );
    }
}

fn print_trace(lines: &[TraceLine]) {
    for line in lines {
        let text = match &line.event {
            CoordinatorEvent::PhaseChanged { from, to } => format!("phase {from} -> {to}"),
            CoordinatorEvent::SelectionChanged { selection } => {
                format!("selection {}", selection.as_deref().unwrap_or("<none>"))
            }
            CoordinatorEvent::CardsReplaced { count } => format!("cards replaced ({count})"),
            CoordinatorEvent::CardsCleared => "cards cleared".to_string(),
            CoordinatorEvent::StaleActionsCancelled { generation, count } => {
                format!("cancelled {count} stale action(s) (generation {generation})")
            }
        };
        println!("[{:>5}ms] {text}", line.at.as_millis());
    }
}
