// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use cell_run_rates::domain::RawReport;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ORDER_HEADERS: &[&str] = &[
    "Item Number",
    "Buyer",
    "OrderQty",
    "WCRMins",
    "PromShip",
    "CustID",
];

pub const ITEM_HEADERS: &[&str] = &["Parent", "Buyer", "Quantity"];

// ==========================================
// 通用表格构建器
// ==========================================
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn build(&self) -> RawReport {
        let rows = self
            .rows
            .iter()
            .map(|values| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned())
                    .collect::<HashMap<_, _>>()
            })
            .collect();
        RawReport::new(self.headers.clone(), rows)
    }

    pub fn to_csv(&self) -> String {
        let mut text = self.headers.join(",");
        text.push('\n');
        for row in &self.rows {
            text.push_str(&row.join(","));
            text.push('\n');
        }
        text
    }

    pub fn write_csv(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.to_csv()).expect("写入测试 CSV 失败");
        path
    }
}

// ==========================================
// 报表 A 订单行构建器
// ==========================================
pub struct OrderRowBuilder {
    item: String,
    buyer: String,
    qty: String,
    wcr_mins: String,
    prom_ship: String,
    cust_id: String,
}

impl OrderRowBuilder {
    pub fn new(item: &str, buyer: &str) -> Self {
        Self {
            item: item.to_string(),
            buyer: buyer.to_string(),
            qty: "1".to_string(),
            wcr_mins: "1".to_string(),
            prom_ship: "01-Jan-24".to_string(),
            cust_id: "C1".to_string(),
        }
    }

    pub fn qty(mut self, qty: &str) -> Self {
        self.qty = qty.to_string();
        self
    }

    pub fn wcr_mins(mut self, mins: &str) -> Self {
        self.wcr_mins = mins.to_string();
        self
    }

    pub fn ship(mut self, date: &str) -> Self {
        self.prom_ship = date.to_string();
        self
    }

    pub fn cust(mut self, cust: &str) -> Self {
        self.cust_id = cust.to_string();
        self
    }

    pub fn values(&self) -> [&str; 6] {
        [
            self.item.as_str(),
            self.buyer.as_str(),
            self.qty.as_str(),
            self.wcr_mins.as_str(),
            self.prom_ship.as_str(),
            self.cust_id.as_str(),
        ]
    }
}

pub fn order_table(rows: &[OrderRowBuilder]) -> TableBuilder {
    rows.iter()
        .fold(TableBuilder::new(ORDER_HEADERS), |table, row| {
            table.row(&row.values())
        })
}

pub fn item_table(rows: &[(&str, &str, &str)]) -> TableBuilder {
    rows.iter()
        .fold(TableBuilder::new(ITEM_HEADERS), |table, (parent, buyer, qty)| {
            table.row(&[*parent, *buyer, *qty])
        })
}
