// ==========================================
// 产线运行速率对账 - 物料领域模型（报表 B）
// ==========================================

use crate::domain::order::Aggregatable;
use crate::domain::types::{GroupField, ValueField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ItemRecord - 物料记录
// ==========================================
// 红线: Quantity 为空的行在汇总前剔除，因此 quantity 非 Option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub parent_part: Option<String>, // Parent
    pub buyer_code: Option<String>,  // Buyer
    pub quantity: f64,               // Quantity

    // 派生字段（导出 Item List Data 用）
    pub minutes_of_job: f64,               // MinutesOfJob = Quantity
    pub total_minutes_of_job: Option<f64>, // TotalMinutesOfJob = 同采购员 Quantity 合计

    pub extra: BTreeMap<String, String>,
    pub row_number: usize,
}

// ==========================================
// RawItemRecord - 导入中间结构体
// ==========================================
// 用途: 字段映射产物；Quantity 为空的行在此之后被剔除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItemRecord {
    pub parent_part: Option<String>,
    pub buyer_code: Option<String>,
    pub quantity: Option<f64>,
    pub extra: BTreeMap<String, String>,
    pub row_number: usize,
}

impl Aggregatable for ItemRecord {
    fn group_key(&self, field: GroupField) -> Option<&str> {
        match field {
            GroupField::Buyer => self.buyer_code.as_deref(),
            GroupField::Part => self.parent_part.as_deref(),
        }
    }

    fn value(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::Quantity => Some(self.quantity),
            _ => None,
        }
    }
}
