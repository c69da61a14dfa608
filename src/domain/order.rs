// ==========================================
// 产线运行速率对账 - 订单领域模型（报表 A）
// ==========================================
// 用途: 规范化器写入，对账引擎与汇总器只读
// ==========================================

use crate::domain::types::{GroupField, ValueField};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// OrderRecord - 订单记录
// ==========================================
// 红线: 采购员编号不以 "8" 开头的记录不进入对账，但保留在报表 A 汇总中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub item_number: Option<String>,                 // Item Number
    pub buyer_code: Option<String>,                  // Buyer（同时作为速率表连接键）
    pub order_quantity: Option<f64>,                 // OrderQty
    pub work_center_minutes_per_unit: Option<f64>,   // WCRMins
    pub promised_ship_date: Option<NaiveDate>,       // PromShip（空值排最后）
    pub customer_id: Option<String>,                 // CustID

    // 未被类型化的源列（透传到导出）
    pub extra: BTreeMap<String, String>,

    // 元信息
    pub row_number: usize, // 原始文件行号
}

impl OrderRecord {
    /// 采购员编号是否以指定前缀开头（缺失视为不满足）
    pub fn buyer_has_prefix(&self, prefix: &str) -> bool {
        self.buyer_code
            .as_deref()
            .map(|b| b.starts_with(prefix))
            .unwrap_or(false)
    }
}

// ==========================================
// ReconciledOrderRecord - 对账后订单
// ==========================================
// 派生字段每次运行重算，不独立持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledOrderRecord {
    pub order: OrderRecord,
    pub item_run_rate: Option<f64>,       // Run Rate（按 Item Number 查表，沿用旧报表列）
    pub daily_cell_run_rate: Option<f64>, // Daily Cell Run Rate（按 buyer_code 查表）
    pub minutes_of_job: Option<f64>,      // MinutesOfJob = WCRMins × OrderQty
    pub exceeds_half_day: bool,           // ExceedsHalfaDaysWork
}

// ==========================================
// Aggregatable - 汇总输入接口
// ==========================================
pub trait Aggregatable {
    fn group_key(&self, field: GroupField) -> Option<&str>;
    fn value(&self, field: ValueField) -> Option<f64>;
}

impl Aggregatable for OrderRecord {
    fn group_key(&self, field: GroupField) -> Option<&str> {
        match field {
            GroupField::Buyer => self.buyer_code.as_deref(),
            GroupField::Part => self.item_number.as_deref(),
        }
    }

    fn value(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::WorkCenterMinutes => self.work_center_minutes_per_unit,
            ValueField::Quantity => None,
        }
    }
}
