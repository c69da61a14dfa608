// ==========================================
// 产线运行速率对账 - 汇总引擎
// ==========================================
// 职责: 按采购员 / 零件分组求和 + 告警标记
// 红线: 两张报表各自独立汇总，不跨报表混合
// 红线: 告警为严格大于阈值（恰好 4000 不告警）
// 排序: 合计降序，合计相同按分组键升序
// ==========================================

use crate::domain::aggregate::{AggregateRow, AggregateTable};
use crate::domain::item::ItemRecord;
use crate::domain::order::{Aggregatable, OrderRecord};
use crate::domain::types::{AlertFlag, GroupField, ValueField};
use crate::importer::schema_validator::{item_columns, order_columns};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// 汇总告警阈值
pub const DEFAULT_ALERT_THRESHOLD: f64 = 4000.0;

/// 四张汇总表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollups {
    pub item_by_buyer: AggregateTable,  // Total Quantity per Buyer
    pub item_by_part: AggregateTable,   // Total Quantity per Part
    pub order_by_buyer: AggregateTable, // Total Quantity per Buyer CoDate
    pub order_by_part: AggregateTable,  // Total Quantity per Part CoDate
}

// ==========================================
// Aggregator - 汇总引擎
// ==========================================
pub struct Aggregator {
    alert_threshold: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}

impl Aggregator {
    pub fn new(alert_threshold: f64) -> Self {
        Self { alert_threshold }
    }

    /// 分组求和
    ///
    /// # 规则
    /// - 分组键缺失的记录跳过
    /// - 数值缺失的记录不计入合计（分组仍保留）
    /// - 合计按记录输入顺序累加
    pub fn aggregate_by<T: Aggregatable>(
        &self,
        records: &[T],
        group_field: GroupField,
        value_field: ValueField,
    ) -> Vec<AggregateRow> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for record in records {
            let Some(key) = record.group_key(group_field) else {
                continue;
            };
            let entry = totals.entry(key).or_insert(0.0);
            if let Some(value) = record.value(value_field) {
                *entry += value;
            }
        }

        let mut rows: Vec<AggregateRow> = totals
            .into_iter()
            .map(|(key, total)| AggregateRow {
                group_key: key.to_string(),
                summed_quantity: total,
                alert: AlertFlag::from_total(total, self.alert_threshold),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.summed_quantity
                .total_cmp(&a.summed_quantity)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });

        debug!(
            group = %group_field,
            value = %value_field,
            groups = rows.len(),
            "分组汇总完成"
        );
        rows
    }

    /// 生成四张汇总表（报表 A × 采购员/零件，报表 B × 采购员/零件）
    ///
    /// # 参数
    /// - `orders`: 报表 A 清洗后记录（前缀过滤前）
    /// - `items`: 报表 B 清洗后记录
    #[instrument(skip(self, orders, items), fields(orders = orders.len(), items = items.len()))]
    pub fn rollups(&self, orders: &[OrderRecord], items: &[ItemRecord]) -> Rollups {
        Rollups {
            item_by_buyer: AggregateTable {
                group_column: item_columns::BUYER.to_string(),
                value_column: item_columns::QUANTITY.to_string(),
                rows: self.aggregate_by(items, GroupField::Buyer, ValueField::Quantity),
            },
            item_by_part: AggregateTable {
                group_column: item_columns::PARENT.to_string(),
                value_column: item_columns::QUANTITY.to_string(),
                rows: self.aggregate_by(items, GroupField::Part, ValueField::Quantity),
            },
            order_by_buyer: AggregateTable {
                group_column: order_columns::BUYER.to_string(),
                value_column: order_columns::WCR_MINS.to_string(),
                rows: self.aggregate_by(orders, GroupField::Buyer, ValueField::WorkCenterMinutes),
            },
            order_by_part: AggregateTable {
                group_column: order_columns::ITEM_NUMBER.to_string(),
                value_column: order_columns::WCR_MINS.to_string(),
                rows: self.aggregate_by(orders, GroupField::Part, ValueField::WorkCenterMinutes),
            },
        }
    }
}
