//! JSON Lines 事例文件读取
//!
//! 每个非空行是一个事例对象，四个字段为按径迹并列的数组：
//!
//! ```text
//! {"P": [[y, z, snp, tgl, q/pt], ...], "alpha": [...], "trackTime": [[t0..t4], ...], "trackLength": [...]}
//! ```
//!
//! 文件按列表顺序读取，视为一个连续的逻辑数据集。

use super::BatchSource;
use crate::core::{TrackBatch, TrackSample};
use crate::error::{AnalysisError, AnalysisResult, format_error_at};
use crate::tools::constants::fields;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::PathBuf;

/// 事例对象中四个字段的键名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// 螺旋参数向量（每径迹5个分量）
    pub params: String,
    /// 倾斜角
    pub alpha: String,
    /// 飞行时间数组（每径迹5个分量）
    pub track_time: String,
    /// 径迹长度
    pub track_length: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            params: fields::PARAMS.to_string(),
            alpha: fields::ALPHA.to_string(),
            track_time: fields::TRACK_TIME.to_string(),
            track_length: fields::TRACK_LENGTH.to_string(),
        }
    }
}

/// 单个事例记录（默认键名）
///
/// 读取时按 `FieldNames` 动态取字段；写出（如合成数据）时使用默认键名。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "P")]
    pub params: Vec<[f64; 5]>,
    pub alpha: Vec<f64>,
    #[serde(rename = "trackTime")]
    pub track_time: Vec<[f64; 5]>,
    #[serde(rename = "trackLength")]
    pub track_length: Vec<f64>,
}

impl EventRecord {
    /// 径迹数量
    pub fn track_count(&self) -> usize {
        self.alpha.len()
    }

    /// 解析一行JSON（按给定键名取字段），并检查四个数组长度一致
    pub fn parse_line(line: &str, names: &FieldNames) -> Result<Self, String> {
        let mut object: Map<String, Value> =
            serde_json::from_str(line).map_err(|e| format!("JSON解析错误: {e}"))?;

        let record = Self {
            params: take_field(&mut object, &names.params)?,
            alpha: take_field(&mut object, &names.alpha)?,
            track_time: take_field(&mut object, &names.track_time)?,
            track_length: take_field(&mut object, &names.track_length)?,
        };
        record.validate_shape(names)?;
        Ok(record)
    }

    fn validate_shape(&self, names: &FieldNames) -> Result<(), String> {
        let tracks = self.track_count();
        let lengths = [
            (&names.params, self.params.len()),
            (&names.track_time, self.track_time.len()),
            (&names.track_length, self.track_length.len()),
        ];
        for (name, len) in lengths {
            if len != tracks {
                return Err(format!(
                    "字段 `{name}` 有 {len} 条径迹，`{}` 有 {tracks} 条 / track count mismatch",
                    names.alpha
                ));
            }
        }
        Ok(())
    }

    /// 展开为扁平的径迹样本
    fn push_samples(&self, event: u64, out: &mut Vec<TrackSample>) {
        for track in 0..self.track_count() {
            out.push(TrackSample {
                event,
                track: track as u32,
                params: self.params[track],
                alpha: self.alpha[track],
                track_time: self.track_time[track],
                track_length: self.track_length[track],
            });
        }
    }
}

fn take_field<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    name: &str,
) -> Result<T, String> {
    let value = object
        .remove(name)
        .ok_or_else(|| format!("缺少字段 `{name}` / missing field"))?;
    serde_json::from_value(value).map_err(|e| format!("字段 `{name}` 形状错误 / bad shape: {e}"))
}

/// 当前打开的文件
struct OpenFile {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

/// 多文件 JSON Lines 批次源
///
/// 每批最多 `max_events` 个事例；批次可以跨文件边界，但不会拆分事例。
pub struct JsonLinesSource {
    files: Vec<PathBuf>,
    next_file: usize,
    current: Option<OpenFile>,
    names: FieldNames,
    max_events: usize,
    next_event: u64,
}

impl JsonLinesSource {
    /// 创建数据源（惰性打开文件）
    ///
    /// # 错误
    ///
    /// * `InvalidInput` - 文件列表为空或 `max_events` 为0
    pub fn open(
        files: Vec<PathBuf>,
        names: FieldNames,
        max_events: usize,
    ) -> AnalysisResult<Self> {
        if files.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "数据文件列表为空 / no data files".to_string(),
            ));
        }
        if max_events == 0 {
            return Err(AnalysisError::InvalidInput(
                "每批事例数必须大于0 / batch size must be positive".to_string(),
            ));
        }

        Ok(Self {
            files,
            next_file: 0,
            current: None,
            names,
            max_events,
            next_event: 0,
        })
    }

    /// 数据文件总数
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 已读取的事例总数
    pub fn events_read(&self) -> u64 {
        self.next_event
    }

    fn open_next_file(&mut self) -> AnalysisResult<bool> {
        let Some(path) = self.files.get(self.next_file).cloned() else {
            return Ok(false);
        };
        self.next_file += 1;

        let file = File::open(&path).map_err(|e| {
            AnalysisError::IoError(std::io::Error::new(
                e.kind(),
                format!("无法打开数据文件 / cannot open {}: {e}", path.display()),
            ))
        })?;
        tracing::debug!(
            file = %path.display(),
            index = self.next_file,
            total = self.files.len(),
            "opened data file"
        );

        self.current = Some(OpenFile {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
        });
        Ok(true)
    }

    /// 读取下一个事例（跨文件），全部耗尽时返回 None
    fn next_event_record(&mut self) -> AnalysisResult<Option<EventRecord>> {
        loop {
            if self.current.is_none() && !self.open_next_file()? {
                return Ok(None);
            }
            let Some(open) = self.current.as_mut() else {
                return Ok(None);
            };

            match open.lines.next() {
                Some(line) => {
                    open.line_number += 1;
                    let line = line.map_err(|e| match e.kind() {
                        // 非UTF-8字节属于数据损坏，而非读取失败
                        ErrorKind::InvalidData => format_error_at(&open.path, open.line_number, e),
                        _ => AnalysisError::IoError(std::io::Error::new(
                            e.kind(),
                            format!("{}:{}: {e}", open.path.display(), open.line_number),
                        )),
                    })?;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return EventRecord::parse_line(trimmed, &self.names)
                        .map(Some)
                        .map_err(|msg| format_error_at(&open.path, open.line_number, msg));
                }
                None => self.current = None,
            }
        }
    }
}

impl BatchSource for JsonLinesSource {
    fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
        let mut batch = TrackBatch::new(self.next_event);

        while batch.event_count() < self.max_events as u64 {
            let Some(record) = self.next_event_record()? else {
                break;
            };
            record.push_samples(self.next_event, &mut batch.samples);
            self.next_event += 1;
            batch.end = self.next_event;
        }

        if batch.event_count() == 0 {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}
