//! 批次预取
//!
//! 在后台线程读取下一个批次，与当前批次的重建重叠执行。
//! 通过有界通道传递，缓冲满时读取线程阻塞（背压），内存占用不超过 depth+1 个批次。

use super::BatchSource;
use crate::core::TrackBatch;
use crate::error::{AnalysisError, AnalysisResult};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// 预取消息 - 显式EOF标记
///
/// 区分"数据已读完"与"读取线程意外退出"。
#[derive(Debug)]
enum Prefetched {
    /// 读取到的批次
    Batch(TrackBatch),
    /// 数据源错误（转发一次后结束）
    Failed(AnalysisError),
    /// 数据已全部读完
    End,
}

/// 预取包装器
pub struct PrefetchSource {
    receiver: Receiver<Prefetched>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl PrefetchSource {
    /// 启动后台读取线程
    ///
    /// # 参数
    ///
    /// * `source` - 被包装的数据源（移动到读取线程）
    /// * `depth` - 通道容量，至少为1
    ///
    /// # 错误
    ///
    /// * `ResourceError` - 线程创建失败
    pub fn spawn<S>(source: S, depth: usize) -> AnalysisResult<Self>
    where
        S: BatchSource + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(depth.max(1));

        let worker = thread::Builder::new()
            .name("batch-prefetch".to_string())
            .spawn(move || produce(source, sender))
            .map_err(|e| AnalysisError::ResourceError(format!("预取线程创建失败: {e}")))?;

        Ok(Self {
            receiver,
            worker: Some(worker),
            finished: false,
        })
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("prefetch worker panicked after signalling end of stream");
        }
    }
}

/// 读取线程主循环：接收端关闭时静默退出
fn produce<S: BatchSource>(mut source: S, sender: Sender<Prefetched>) {
    loop {
        let message = match source.next_batch() {
            Ok(Some(batch)) => Prefetched::Batch(batch),
            Ok(None) => Prefetched::End,
            Err(e) => Prefetched::Failed(e),
        };
        let terminal = !matches!(message, Prefetched::Batch(_));

        if sender.send(message).is_err() || terminal {
            return;
        }
    }
}

impl BatchSource for PrefetchSource {
    fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
        if self.finished {
            return Ok(None);
        }

        match self.receiver.recv() {
            Ok(Prefetched::Batch(batch)) => Ok(Some(batch)),
            Ok(Prefetched::End) => {
                self.finished = true;
                self.join_worker();
                Ok(None)
            }
            Ok(Prefetched::Failed(e)) => {
                self.finished = true;
                self.join_worker();
                Err(e)
            }
            Err(_) => {
                self.finished = true;
                Err(AnalysisError::ResourceError(
                    "预取线程意外退出 / prefetch worker exited without end-of-stream".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn batches(n: u64) -> Vec<TrackBatch> {
        (0..n)
            .map(|i| TrackBatch {
                start: i * 3,
                end: i * 3 + 3,
                samples: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_prefetch_preserves_order() {
        let mut source = PrefetchSource::spawn(MemorySource::new(batches(20)), 2).unwrap();
        let mut seen = Vec::new();
        while let Some(batch) = source.next_batch().unwrap() {
            seen.push(batch.start);
        }
        assert_eq!(seen, (0..20).map(|i| i * 3).collect::<Vec<_>>());
        // EOF 之后持续返回 None
        assert!(source.next_batch().unwrap().is_none());
    }

    struct FailingSource {
        remaining: usize,
    }

    impl BatchSource for FailingSource {
        fn next_batch(&mut self) -> AnalysisResult<Option<TrackBatch>> {
            if self.remaining == 0 {
                return Err(AnalysisError::FormatError("broken line".to_string()));
            }
            self.remaining -= 1;
            Ok(Some(TrackBatch::new(0)))
        }
    }

    #[test]
    fn test_prefetch_forwards_error_once() {
        let mut source = PrefetchSource::spawn(FailingSource { remaining: 2 }, 1).unwrap();
        assert!(source.next_batch().unwrap().is_some());
        assert!(source.next_batch().unwrap().is_some());
        assert!(matches!(
            source.next_batch(),
            Err(AnalysisError::FormatError(_))
        ));
        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_drop_before_exhaustion_does_not_hang() {
        let mut source = PrefetchSource::spawn(MemorySource::new(batches(100)), 1).unwrap();
        assert!(source.next_batch().unwrap().is_some());
        drop(source);
    }
}
