// ==========================================
// 产线运行速率对账 - 原始报表结构
// ==========================================
// 用途: 文件解析产物（表头 + 行记录），供规范化器消费
// 生命周期: 仅在单次运行的导入流程内
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始报表（已 TRIM，空白行已剔除）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReport {
    /// 表头（保持源文件顺序）
    pub headers: Vec<String>,
    /// 行记录（列名 → 单元格文本）
    pub rows: Vec<HashMap<String, String>>,
}

impl RawReport {
    pub fn new(headers: Vec<String>, rows: Vec<HashMap<String, String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 查找实际表头（忽略首尾空白和大小写）
    pub fn find_header(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .find(|h| h.trim().to_lowercase() == wanted)
            .map(|h| h.as_str())
    }
}

// ==========================================
// RowIssue - 行级问题记录
// ==========================================
// 用途: 规范化报告，不阻断整张报表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueLevel {
    Warning, // 字段置空，行保留
    Dropped, // 行被剔除
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row_number: usize,
    pub field: String,
    pub level: IssueLevel,
    pub message: String,
}
