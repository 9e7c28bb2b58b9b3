//! mass-synth - 合成TOF数据集生成工具
//!
//! 为已知粒子种类生成确定性的 JSON Lines 事例文件与对应的文件列表，
//! 用于端到端手工运行与性能基准。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tof_mass_tool::source::EventRecord;
use tof_mass_tool::tools::init_tracing;

// ============================================================================
// 常量定义
// ============================================================================

/// 粒子种类 (名称, 质量 GeV/c²)
const SPECIES: &[(&str, f64)] = &[("pion", 0.1396), ("kaon", 0.4937), ("proton", 0.9383)];

/// 光速 (m/s)
const SPEED_OF_LIGHT: f64 = 3.0e8;

/// 动量网格 (GeV/c)
const MOMENTUM_GRID: &[f64] = &[0.4, 0.6, 0.8, 1.0, 1.3, 1.7, 2.2, 3.0];

/// 倾斜角网格 (rad)
const ALPHA_GRID: &[f64] = &[-2.79, -1.75, -0.70, 0.35, 1.40, 2.44];

/// 参考层前各探测层的飞行时间比例
const LAYER_FRACTIONS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

// ============================================================================
// CLI 定义
// ============================================================================

#[derive(Parser)]
#[command(name = "mass-synth")]
#[command(about = "合成TOF数据集生成工具 / Synthetic TOF dataset generator")]
#[command(version)]
struct Cli {
    /// 输出目录
    /// Output directory
    #[arg(long, short = 'o', default_value = "synth-data")]
    output_dir: PathBuf,

    /// 数据文件数
    /// Number of data files
    #[arg(long, short = 'f', default_value_t = 4)]
    files: usize,

    /// 每个文件的事例数
    /// Events per file
    #[arg(long, short = 'e', default_value_t = 5000)]
    events_per_file: usize,

    /// 每个事例的径迹数
    /// Tracks per event
    #[arg(long, short = 't', default_value_t = 6)]
    tracks_per_event: usize,

    /// 每N条径迹中有1条不满足过滤条件（0为全部有效）
    /// One in N tracks fails the track filter (0 disables)
    #[arg(long, default_value_t = 10)]
    ineligible_every: usize,

    /// 显示详细信息
    /// Verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

// ============================================================================
// 事例生成
// ============================================================================

/// 单条径迹的生成参数
struct TrackSeed {
    mass: f64,
    momentum: f64,
    alpha: f64,
    sin_phi: f64,
    tan_lambda: f64,
    charge: f64,
    length_cm: f64,
}

impl TrackSeed {
    /// 由全局径迹序号确定性地选取网格点
    fn from_index(index: usize) -> Self {
        let (_, mass) = SPECIES[index % SPECIES.len()];
        Self {
            mass,
            momentum: MOMENTUM_GRID[(index / SPECIES.len()) % MOMENTUM_GRID.len()],
            alpha: ALPHA_GRID[index % ALPHA_GRID.len()],
            sin_phi: ((index % 19) as f64 - 9.0) * 0.1,
            tan_lambda: ((index % 11) as f64 - 5.0) * 0.15,
            charge: if index % 2 == 0 { 1.0 } else { -1.0 },
            length_cm: 300.0 + (index % 7) as f64 * 25.0,
        }
    }

    fn params(&self) -> [f64; 5] {
        let pt = self.momentum / (1.0 + self.tan_lambda * self.tan_lambda).sqrt();
        [0.0, 0.0, self.sin_phi, self.tan_lambda, self.charge / pt]
    }

    fn track_time(&self) -> [f64; 5] {
        let beta = self.momentum / (self.momentum.powi(2) + self.mass.powi(2)).sqrt();
        let tof_ps = self.length_cm / 100.0 / (beta * SPEED_OF_LIGHT) * 1.0e12;
        let mut time = [0.0; 5];
        for (slot, fraction) in time.iter_mut().zip(LAYER_FRACTIONS) {
            *slot = tof_ps * fraction;
        }
        time[4] = tof_ps;
        time
    }
}

fn build_event(first_track: usize, tracks: usize, ineligible_every: usize) -> EventRecord {
    let mut record = EventRecord::default();
    for index in first_track..first_track + tracks {
        let seed = TrackSeed::from_index(index);
        let mut time = seed.track_time();
        let mut length = seed.length_cm;

        if ineligible_every > 0 && index % ineligible_every == ineligible_every - 1 {
            // 交替制造两种不满足过滤条件的径迹
            if (index / ineligible_every) % 2 == 0 {
                length = 0.0;
            } else {
                time[4] = -1.0;
            }
        }

        record.params.push(seed.params());
        record.alpha.push(seed.alpha);
        record.track_time.push(time);
        record.track_length.push(length);
    }
    record
}

fn write_data_file(path: &Path, first_event: usize, cli: &Cli) -> Result<()> {
    let file = File::create(path).with_context(|| format!("无法创建 {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for event in first_event..first_event + cli.events_per_file {
        let record = build_event(
            event * cli.tracks_per_event,
            cli.tracks_per_event,
            cli.ineligible_every,
        );
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    ensure!(cli.files > 0, "--files 必须大于0 / must be positive");
    ensure!(cli.tracks_per_event > 0, "--tracks-per-event 必须大于0 / must be positive");

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("无法创建输出目录 {}", cli.output_dir.display()))?;

    let mut list = String::from("# mass-synth dataset\n");
    for file_index in 0..cli.files {
        let name = format!("synth_{file_index:03}.jsonl");
        let path = cli.output_dir.join(&name);
        write_data_file(&path, file_index * cli.events_per_file, &cli)?;
        tracing::debug!(file = %path.display(), "data file written");
        list.push_str(&name);
        list.push('\n');
    }

    let list_path = cli.output_dir.join("files.txt");
    fs::write(&list_path, list).with_context(|| format!("无法写入 {}", list_path.display()))?;

    let total_events = cli.files * cli.events_per_file;
    println!("合成数据集已生成 / Synthetic dataset written");
    println!("   文件 / files: {}", cli.files);
    println!("   事例 / events: {total_events}");
    println!("   径迹 / tracks: {}", total_events * cli.tracks_per_event);
    println!(
        "   种类 / species: {}",
        SPECIES
            .iter()
            .map(|(name, mass)| format!("{name} ({mass} GeV)"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("   文件列表 / file list: {}", list_path.display());

    Ok(())
}
