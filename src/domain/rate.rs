// ==========================================
// 产线运行速率对账 - 单元运行速率表
// ==========================================
// 职责: 工作中心 → 日产能（分钟）映射，支持单条/批量覆写
// 红线: 未知工作中心直接新增，不拒绝
// 红线: 批量粘贴中的坏行跳过，不使整批失败
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// 出厂默认速率（单元 → 日产能分钟数）
pub const DEFAULT_CELL_RUN_RATES: &[(&str, f64)] = &[
    ("800", 434.16),
    ("801", 1806.20),
    ("802", 10.00),
    ("803", 1195.80),
    ("804", 3545.20),
    ("805", 0.00),
    ("806", 0.00),
    ("807", 0.00),
    ("808", 0.00),
    ("809", 73.00),
    ("810", 3749.20),
    ("811", 3066.80),
    ("812", 1288.40),
    ("813", 773.60),
    ("814", 546.60),
    ("815", 458.40),
    ("816", 1610.20),
    ("817", 2131.40),
    ("818", 21.92),
    ("819", 322.20),
    ("820", 4696.00),
    ("821", 3095.20),
    ("822", 2634.00),
    ("823", 1889.76),
    ("824", 770.80),
    ("825", 504.40),
    ("826", 1681.20),
    ("827", 824.40),
    ("828", 3120.00),
    ("829", 1095.40),
    ("830", 12000.00),
    ("831", 12000.00),
    ("832", 75.00),
    ("833", 1440.00),
    ("834", 1413.00),
    ("836", 205.80),
    ("837", 83.40),
    ("838", 1280.80),
    ("840", 460.00),
    ("841", 460.00),
    ("842", 460.00),
    ("843", 460.00),
    ("844", 460.00),
    ("850", 460.00),
    ("G3A", 0.00),
    ("LB", 1031.00),
    ("MAN", 6976.00),
    ("47P", 0.00),
    ("TR4", 132.48),
    ("83I", 6976.00),
    ("83H", 1413.00),
    ("835", 1413.00),
    ("839", 1031.00),
    ("KOP", 0.00),
    ("HVY", 1413.00),
];

// ==========================================
// RateEntry - 单条速率
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub work_center_id: String,  // 工作中心（单元）编号
    pub daily_rate_minutes: f64, // 日产能（分钟，≥ 0）
}

// ==========================================
// 批量粘贴错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateInputError {
    #[error("速率行格式错误 (行 {line_number}): {reason} [{raw}]")]
    MalformedRateInput {
        line_number: usize,
        raw: String,
        reason: String,
    },
}

/// 批量覆写结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkUpsertOutcome {
    pub applied: Vec<String>,           // 已写入的工作中心（按粘贴顺序）
    pub skipped: Vec<RateInputError>,   // 被跳过的坏行
}

// ==========================================
// RateTable - 速率表
// ==========================================
// 生命周期: 单次运行；运行期间只读
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// 空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 以出厂默认值初始化
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (id, rate) in DEFAULT_CELL_RUN_RATES {
            table.upsert(*id, *rate);
        }
        table
    }

    pub fn get_rate(&self, work_center_id: &str) -> Option<f64> {
        self.rates.get(work_center_id).copied()
    }

    /// 写入或覆盖单条速率
    pub fn upsert(&mut self, work_center_id: impl Into<String>, rate: f64) {
        self.rates.insert(work_center_id.into(), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// 按工作中心编号排序输出（导出用，保证确定性）
    pub fn entries(&self) -> Vec<RateEntry> {
        let mut entries: Vec<RateEntry> = self
            .rates
            .iter()
            .map(|(id, rate)| RateEntry {
                work_center_id: id.clone(),
                daily_rate_minutes: *rate,
            })
            .collect();
        entries.sort_by(|a, b| a.work_center_id.cmp(&b.work_center_id));
        entries
    }

    /// 批量覆写（从 Excel 粘贴的松散文本）
    ///
    /// # 规则
    /// - 每行按空白切分；首个 token 为工作中心，末尾 token 为速率
    /// - 速率去除千分位逗号后解析
    /// - 不足两个 token / 速率无法解析 / 负数或非有限值 → 跳过该行
    /// - 空行直接忽略
    pub fn bulk_upsert(&mut self, text: &str) -> BulkUpsertOutcome {
        let mut outcome = BulkUpsertOutcome::default();

        for (idx, line) in text.lines().enumerate() {
            let line_number = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            match parse_rate_line(line, line_number) {
                Ok((id, rate)) => {
                    self.upsert(id.clone(), rate);
                    outcome.applied.push(id);
                }
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "跳过速率坏行");
                    outcome.skipped.push(e);
                }
            }
        }

        outcome
    }
}

/// 解析单行 "ID ... RATE"
fn parse_rate_line(line: &str, line_number: usize) -> Result<(String, f64), RateInputError> {
    let malformed = |reason: &str| RateInputError::MalformedRateInput {
        line_number,
        raw: line.trim().to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(malformed("缺少速率列"));
    }

    let id = tokens[0].to_string();
    let raw_rate = tokens[tokens.len() - 1].replace(',', "");
    let rate = raw_rate
        .parse::<f64>()
        .map_err(|_| malformed("速率无法解析为数值"))?;

    if !rate.is_finite() || rate < 0.0 {
        return Err(malformed("速率必须为非负有限值"));
    }

    Ok((id, rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_round_trip() {
        let mut table = RateTable::new();
        table.upsert("801", 1806.2);
        assert_eq!(table.get_rate("801"), Some(1806.2));

        table.upsert("801", 99.0);
        assert_eq!(table.get_rate("801"), Some(99.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_defaults_seeded() {
        let table = RateTable::with_defaults();
        assert_eq!(table.len(), DEFAULT_CELL_RUN_RATES.len());
        assert_eq!(table.get_rate("800"), Some(434.16));
        assert_eq!(table.get_rate("HVY"), Some(1413.0));
        assert_eq!(table.get_rate("999"), None);
    }

    #[test]
    fn test_bulk_upsert_mixed_validity() {
        let mut table = RateTable::new();
        let outcome = table.bulk_upsert("801 1,806.20\nbad\n802 10.00");

        assert_eq!(outcome.applied, vec!["801".to_string(), "802".to_string()]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(table.get_rate("801"), Some(1806.20));
        assert_eq!(table.get_rate("802"), Some(10.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_bulk_upsert_uses_last_token_and_inserts_unknown() {
        let mut table = RateTable::with_defaults();
        let outcome = table.bulk_upsert("NEW1  Cell  New   2,500\n");

        assert!(outcome.skipped.is_empty());
        assert_eq!(table.get_rate("NEW1"), Some(2500.0));
        assert_eq!(table.len(), DEFAULT_CELL_RUN_RATES.len() + 1);
    }

    #[test]
    fn test_bulk_upsert_skips_unparsable_and_negative() {
        let mut table = RateTable::new();
        let outcome = table.bulk_upsert("803 abc\n804 -5\n\n805 1.5");

        assert_eq!(outcome.applied, vec!["805".to_string()]);
        assert_eq!(outcome.skipped.len(), 2);
        match &outcome.skipped[0] {
            RateInputError::MalformedRateInput { line_number, .. } => {
                assert_eq!(*line_number, 1)
            }
        }
        assert_eq!(table.get_rate("803"), None);
    }

    #[test]
    fn test_entries_sorted() {
        let mut table = RateTable::new();
        table.upsert("B", 1.0);
        table.upsert("A", 2.0);
        let ids: Vec<String> = table.entries().into_iter().map(|e| e.work_center_id).collect();
        assert_eq!(ids, vec!["A".to_string(), "B".to_string()]);
    }
}
