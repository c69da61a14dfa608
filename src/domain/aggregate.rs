// ==========================================
// 产线运行速率对账 - 汇总领域模型
// ==========================================

use crate::domain::types::AlertFlag;
use serde::{Deserialize, Serialize};

/// 汇总行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub group_key: String,
    pub summed_quantity: f64,
    pub alert: AlertFlag,
}

/// 汇总表（带导出列名）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTable {
    pub group_column: String, // 如 "Buyer" / "Parent" / "Item Number"
    pub value_column: String, // 如 "Quantity" / "WCRMins"
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn alert_count(&self) -> usize {
        self.rows.iter().filter(|r| r.alert.is_alert()).count()
    }
}
