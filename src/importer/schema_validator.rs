// ==========================================
// 产线运行速率对账 - 报表结构校验器
// ==========================================
// 职责: 必需列存在性校验 + 列名别名解析
// 红线: 缺少必需列 → SchemaError，整张报表作废，不返回部分结果
// ==========================================

use crate::domain::report::RawReport;
use crate::domain::types::ReportKind;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

/// 列定义（标准列名 + 别名）
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

// ==========================================
// 报表 A 列名（CoDate）
// ==========================================
pub mod order_columns {
    pub const ITEM_NUMBER: &str = "Item Number";
    pub const BUYER: &str = "Buyer";
    pub const ORDER_QTY: &str = "OrderQty";
    pub const WCR_MINS: &str = "WCRMins";
    pub const PROM_SHIP: &str = "PromShip";
    pub const CUST_ID: &str = "CustID";
}

// ==========================================
// 报表 B 列名（Item List）
// ==========================================
pub mod item_columns {
    pub const PARENT: &str = "Parent";
    pub const BUYER: &str = "Buyer";
    pub const QUANTITY: &str = "Quantity";
}

pub const ORDER_REPORT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: order_columns::ITEM_NUMBER,
        aliases: &["Item No", "Item", "ItemNumber"],
        required: true,
    },
    ColumnSpec {
        canonical: order_columns::BUYER,
        aliases: &["Buyer Code"],
        required: true,
    },
    ColumnSpec {
        canonical: order_columns::ORDER_QTY,
        aliases: &["Order Qty", "Order Quantity"],
        required: true,
    },
    ColumnSpec {
        canonical: order_columns::WCR_MINS,
        aliases: &["WCR Mins"],
        required: true,
    },
    ColumnSpec {
        canonical: order_columns::PROM_SHIP,
        aliases: &["Prom Ship", "Promised Ship"],
        required: true,
    },
    // 缺少该列时不做客户过滤
    ColumnSpec {
        canonical: order_columns::CUST_ID,
        aliases: &["Cust ID", "Customer"],
        required: false,
    },
];

pub const ITEM_REPORT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: item_columns::QUANTITY,
        aliases: &["Qty"],
        required: true,
    },
    ColumnSpec {
        canonical: item_columns::BUYER,
        aliases: &["Buyer Code"],
        required: true,
    },
    ColumnSpec {
        canonical: item_columns::PARENT,
        aliases: &["Parent Part"],
        required: true,
    },
];

// ==========================================
// ColumnMap - 标准列名 → 实际表头
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    resolved: HashMap<&'static str, String>,
}

impl ColumnMap {
    /// 实际表头（未解析到返回 None）
    pub fn header(&self, canonical: &str) -> Option<&str> {
        self.resolved.get(canonical).map(|s| s.as_str())
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.resolved.contains_key(canonical)
    }

    /// 是否为已类型化的列（非透传列）
    pub fn is_mapped_header(&self, header: &str) -> bool {
        self.resolved.values().any(|h| h == header)
    }
}

pub struct SchemaValidator;

impl SchemaValidator {
    /// 解析并校验列
    ///
    /// # 返回
    /// - Ok(ColumnMap): 所有必需列均存在
    /// - Err(SchemaError): 第一个缺失的必需列
    pub fn resolve_columns(
        &self,
        report: &RawReport,
        kind: ReportKind,
        specs: &[ColumnSpec],
    ) -> ImportResult<ColumnMap> {
        let mut map = ColumnMap::default();

        for spec in specs {
            let found = std::iter::once(spec.canonical)
                .chain(spec.aliases.iter().copied())
                .find_map(|name| report.find_header(name));

            match found {
                Some(header) => {
                    map.resolved.insert(spec.canonical, header.to_string());
                }
                None if spec.required => {
                    return Err(ImportError::SchemaError {
                        report: kind,
                        column: spec.canonical.to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(map)
    }
}
