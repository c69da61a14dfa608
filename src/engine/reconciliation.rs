// ==========================================
// 产线运行速率对账 - 对账引擎
// ==========================================
// 输入: 前缀过滤后的订单 + 速率表（运行期间只读）
// 输出: 对账后订单（全量保留）+ 关键订单子集
// ==========================================
// 红线: 左连接，速率缺失的订单仍然保留
// 红线: 速率缺失 → exceeds_half_day = false（无法证明关键，不默认关键）
// 红线: 乘数缺失 → minutes_of_job = None（不按 0 处理）
// 说明: 连接键为 buyer_code（与速率表的工作中心编号口径不同，保持原有行为）
// ==========================================

use crate::domain::order::{OrderRecord, ReconciledOrderRecord};
use crate::domain::rate::RateTable;
use tracing::{info, instrument};

/// 半天产能占日产能的比例
pub const DEFAULT_HALF_DAY_FRACTION: f64 = 0.5;

// ==========================================
// ReconciliationEngine - 对账引擎
// ==========================================
pub struct ReconciliationEngine {
    half_day_fraction: f64,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_DAY_FRACTION)
    }
}

impl ReconciliationEngine {
    pub fn new(half_day_fraction: f64) -> Self {
        Self { half_day_fraction }
    }

    /// 订单 × 速率表左连接 + 派生负荷字段
    ///
    /// # 参数
    /// - `orders`: 已规范化、已前缀过滤的订单（顺序保持）
    /// - `rates`: 最终速率表
    ///
    /// # 返回
    /// 与输入等长、同序的对账结果
    #[instrument(skip(self, orders, rates), fields(orders = orders.len(), rates = rates.len()))]
    pub fn reconcile(
        &self,
        orders: &[OrderRecord],
        rates: &RateTable,
    ) -> Vec<ReconciledOrderRecord> {
        let reconciled: Vec<ReconciledOrderRecord> = orders
            .iter()
            .map(|order| self.reconcile_one(order, rates))
            .collect();

        let unmatched = reconciled
            .iter()
            .filter(|r| r.daily_cell_run_rate.is_none())
            .count();
        info!(
            total = reconciled.len(),
            unmatched_rate = unmatched,
            "对账完成"
        );

        reconciled
    }

    /// 单条订单对账
    pub fn reconcile_one(&self, order: &OrderRecord, rates: &RateTable) -> ReconciledOrderRecord {
        let daily_cell_run_rate = order
            .buyer_code
            .as_deref()
            .and_then(|buyer| rates.get_rate(buyer));
        let item_run_rate = order
            .item_number
            .as_deref()
            .and_then(|item| rates.get_rate(item));

        let minutes_of_job = match (order.work_center_minutes_per_unit, order.order_quantity) {
            (Some(per_unit), Some(quantity)) => Some(per_unit * quantity),
            _ => None,
        };

        let exceeds_half_day = match (minutes_of_job, daily_cell_run_rate) {
            (Some(minutes), Some(rate)) => minutes > self.half_day_fraction * rate,
            _ => false,
        };

        ReconciledOrderRecord {
            order: order.clone(),
            item_run_rate,
            daily_cell_run_rate,
            minutes_of_job,
            exceeds_half_day,
        }
    }

    /// 关键订单子集（exceeds_half_day = true，顺序保持）
    pub fn critical_subset(&self, records: &[ReconciledOrderRecord]) -> Vec<ReconciledOrderRecord> {
        records
            .iter()
            .filter(|r| r.exceeds_half_day)
            .cloned()
            .collect()
    }
}
