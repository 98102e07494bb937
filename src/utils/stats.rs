use std::time::Duration;

/// 逐帧耗时统计
///
/// 记录每次检测的耗时，汇总平均、最小、最大耗时和帧率。
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    count: u32,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total += duration;
        self.min = Some(self.min.map_or(duration, |min| min.min(duration)));
        self.max = self.max.max(duration);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Option<Duration> {
        (self.count > 0).then_some(self.max)
    }

    pub fn mean(&self) -> Option<Duration> {
        (self.count > 0).then(|| self.total / self.count)
    }

    /// 按平均耗时计算的帧率
    pub fn fps(&self) -> Option<f64> {
        self.mean()
            .map(|mean| mean.as_secs_f64())
            .filter(|secs| *secs > 0.0)
            .map(|secs| 1.0 / secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_have_no_summary() {
        let stats = RunStats::new();
        assert_eq!(stats.count(), 0);
        assert!(stats.mean().is_none());
        assert!(stats.min().is_none());
        assert!(stats.max().is_none());
        assert!(stats.fps().is_none());
    }

    #[test]
    fn summarizes_recorded_durations() {
        let mut stats = RunStats::new();
        for ms in [30, 10, 20] {
            stats.record(Duration::from_millis(ms));
        }
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.total(), Duration::from_millis(60));
        assert_eq!(stats.min(), Some(Duration::from_millis(10)));
        assert_eq!(stats.max(), Some(Duration::from_millis(30)));
        assert_eq!(stats.mean(), Some(Duration::from_millis(20)));
        assert!((stats.fps().unwrap() - 50.0).abs() < 1e-9);
    }
}
