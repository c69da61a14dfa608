// ==========================================
// 产线运行速率对账 - 拉取重试
// ==========================================
// 红线: 有界顺序重试，显式计数，固定间隔
// 红线: 耗尽后返回 Unavailable，不带部分数据进入核心流程
// 红线: 文件已到但解析失败立即返回，不重试
// ==========================================

use crate::domain::report::RawReport;
use crate::domain::types::ReportKind;
use crate::fetch::error::{FetchError, FetchResult};
use crate::fetch::source::ReportSource;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// 带重试拉取报表
///
/// # 返回
/// - Ok(RawReport): 任一次尝试成功
/// - Err(FetchError::Unavailable): max_attempts 次均失败
/// - Err(FetchError::Read): 报表文件无法解析（首次即返回）
#[instrument(skip(source, policy), fields(max_attempts = policy.max_attempts))]
pub async fn fetch_with_retry<S>(
    source: &S,
    kind: ReportKind,
    policy: &RetryPolicy,
) -> FetchResult<RawReport>
where
    S: ReportSource + ?Sized,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match source.fetch(kind).await {
            Ok(report) => {
                info!(attempt, rows = report.len(), "报表拉取成功");
                return Ok(report);
            }
            Err(e) if !e.is_retryable() => {
                warn!(attempt, error = %e, "报表无法解析，不再重试");
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                warn!(attempt, error = %e, "报表拉取失败，重试已耗尽");
                return Err(FetchError::Unavailable {
                    kind,
                    attempts: attempt,
                    last_error: e.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    backoff_secs = policy.backoff.as_secs_f64(),
                    error = %e,
                    "报表拉取失败，等待后重试"
                );
                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 前 N 次失败，之后成功
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReportSource for FlakySource {
        async fn fetch(&self, kind: ReportKind) -> FetchResult<RawReport> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(FetchError::NotFound {
                    kind,
                    dir: "mem".to_string(),
                    marker: "X".to_string(),
                });
            }
            Ok(RawReport::new(vec!["A".to_string()], Vec::new()))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let source = FlakySource {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = fetch_with_retry(&source, ReportKind::OrderReport, &fast_policy()).await;
        assert!(result.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_yields_unavailable() {
        let source = FlakySource {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        let err = fetch_with_retry(&source, ReportKind::ItemReport, &fast_policy())
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
        assert!(matches!(err, FetchError::Unavailable { attempts: 3, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    /// 文件存在但内容损坏
    struct CorruptSource {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReportSource for CorruptSource {
        async fn fetch(&self, kind: ReportKind) -> FetchResult<RawReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Read {
                kind,
                source: ImportError::CsvParseError("bad record".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_read_error_is_not_retried() {
        let source = CorruptSource {
            calls: AtomicU32::new(0),
        };
        let policy = RetryPolicy::new(3, Duration::from_secs(60));
        let err = fetch_with_retry(&source, ReportKind::OrderReport, &policy)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Read { .. }));
        assert!(!err.is_retryable());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_requires_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::default().backoff, Duration::from_secs(5));
    }
}
