// ==========================================
// 产线运行速率对账 - 领域类型定义
// ==========================================
// 职责: 报表种类、告警标记、分组与汇总字段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 报表种类 (Report Kind)
// ==========================================
// A: 订单承诺发货日期报表（CoDate）
// B: 物料部门工作中心报表（Item List）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    OrderReport, // 报表 A
    ItemReport,  // 报表 B
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::OrderReport => write!(f, "ORDER_REPORT"),
            ReportKind::ItemReport => write!(f, "ITEM_REPORT"),
        }
    }
}

// ==========================================
// 汇总告警标记 (Alert Flag)
// ==========================================
// 红线: 阈值为严格大于（恰好等于阈值不告警）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertFlag {
    None,  // 正常
    Alert, // 超阈值
}

impl AlertFlag {
    /// 按阈值判定告警（sum > threshold）
    pub fn from_total(total: f64, threshold: f64) -> Self {
        if total > threshold {
            AlertFlag::Alert
        } else {
            AlertFlag::None
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, AlertFlag::Alert)
    }

    /// 导出用标签（告警为 "Alert"，否则为空）
    pub fn label(&self) -> &'static str {
        match self {
            AlertFlag::None => "",
            AlertFlag::Alert => "Alert",
        }
    }
}

impl fmt::Display for AlertFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertFlag::None => write!(f, "NONE"),
            AlertFlag::Alert => write!(f, "ALERT"),
        }
    }
}

// ==========================================
// 分组字段 (Group Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupField {
    Buyer, // 按采购员/工作中心
    Part,  // 按零件（报表 A: Item Number, 报表 B: Parent）
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupField::Buyer => write!(f, "BUYER"),
            GroupField::Part => write!(f, "PART"),
        }
    }
}

// ==========================================
// 汇总数值字段 (Value Field)
// ==========================================
// 报表 A 汇总 WCRMins，报表 B 汇总 Quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueField {
    Quantity,          // 报表 B: Quantity
    WorkCenterMinutes, // 报表 A: WCRMins
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueField::Quantity => write!(f, "QUANTITY"),
            ValueField::WorkCenterMinutes => write!(f, "WORK_CENTER_MINUTES"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_flag_boundary() {
        assert_eq!(AlertFlag::from_total(4000.0, 4000.0), AlertFlag::None);
        assert_eq!(AlertFlag::from_total(4000.01, 4000.0), AlertFlag::Alert);
        assert_eq!(AlertFlag::from_total(-1.0, 4000.0), AlertFlag::None);
    }

    #[test]
    fn test_alert_flag_label() {
        assert_eq!(AlertFlag::Alert.label(), "Alert");
        assert_eq!(AlertFlag::None.label(), "");
        assert!(AlertFlag::Alert.is_alert());
    }
}
