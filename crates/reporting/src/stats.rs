//! Pure financial aggregation over orders and expenses.

use std::collections::BTreeMap;

use domain::{Money, OrderStatus, PaymentMethod};
use serde::Serialize;

use crate::expense::Expense;
use crate::views::OrderRecord;

/// One labelled bucket of a breakdown. Zero-value buckets are never
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub label: String,
    pub value: i64,
}

/// Derived financial figures for the operator dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialStats {
    /// Σ grand_total over completed orders. Nothing else counts as
    /// revenue, authorized or not.
    pub total_revenue: Money,

    /// Σ delivery_charge over the same completed set.
    pub delivery_revenue: Money,

    /// Σ amount over all recorded expenses.
    pub total_expenses: Money,

    /// total_revenue − total_expenses.
    pub net_profit: Money,

    /// Every order ever seen.
    pub total_orders: usize,

    /// Orders still in a non-terminal status.
    pub pending_orders: usize,

    /// Orders in Completed.
    pub completed_orders: usize,

    /// Orders in Cancelled.
    pub cancelled_orders: usize,

    /// Order counts per current status.
    pub status_breakdown: Vec<Distribution>,

    /// Revenue (minor units) per product category within completed orders.
    pub category_breakdown: Vec<Distribution>,

    /// Revenue (minor units) per payment method within completed orders.
    pub payment_breakdown: Vec<Distribution>,
}

/// Percentage of `part` in `whole`, guarding a zero divisor.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

const STATUS_ORDER: [OrderStatus; 6] = [
    OrderStatus::Created,
    OrderStatus::Confirmed,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

const PAYMENT_ORDER: [PaymentMethod; 3] = [
    PaymentMethod::Esewa,
    PaymentMethod::Khalti,
    PaymentMethod::Card,
];

/// Computes dashboard statistics from the full order and expense sets.
///
/// Pure and stateless: callers pass everything in, nothing is cached, and
/// calling twice with the same input yields the same output. Safe on
/// empty input — every figure is zero and every breakdown empty.
pub fn compute_stats(orders: &[OrderRecord], expenses: &[Expense]) -> FinancialStats {
    let completed: Vec<&OrderRecord> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .collect();

    let total_revenue: Money = completed.iter().map(|o| o.grand_total).sum();
    let delivery_revenue: Money = completed.iter().map(|o| o.delivery_charge).sum();
    let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();

    let cancelled_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Cancelled)
        .count();
    let pending_orders = orders.iter().filter(|o| !o.status.is_terminal()).count();

    let status_breakdown = STATUS_ORDER
        .iter()
        .filter_map(|status| {
            let count = orders.iter().filter(|o| o.status == *status).count();
            (count > 0).then(|| Distribution {
                label: status.as_str().to_string(),
                value: count as i64,
            })
        })
        .collect();

    // Category revenue from line totals; delivery charges are not part of
    // any category.
    let mut by_category: BTreeMap<String, i64> = BTreeMap::new();
    for order in &completed {
        for line in &order.lines {
            *by_category.entry(line.category.clone()).or_insert(0) +=
                line.line_total().minor();
        }
    }
    let category_breakdown = by_category
        .into_iter()
        .filter(|(_, value)| *value != 0)
        .map(|(label, value)| Distribution { label, value })
        .collect();

    let payment_breakdown = PAYMENT_ORDER
        .iter()
        .filter_map(|method| {
            let value: i64 = completed
                .iter()
                .filter(|o| o.payment_method == *method)
                .map(|o| o.grand_total.minor())
                .sum();
            (value != 0).then(|| Distribution {
                label: method.as_str().to_string(),
                value,
            })
        })
        .collect();

    FinancialStats {
        total_revenue,
        delivery_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
        total_orders: orders.len(),
        pending_orders,
        completed_orders: completed.len(),
        cancelled_orders,
        status_breakdown,
        category_breakdown,
        payment_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::{ExpenseCategory, ExpenseId};
    use chrono::Utc;
    use common::AggregateId;
    use domain::{Actor, CustomerId, DeliveryLocation, OrderLine, StatusEntry};

    fn record(
        status: OrderStatus,
        payment_method: PaymentMethod,
        lines: Vec<OrderLine>,
        delivery_charge: Money,
    ) -> OrderRecord {
        let customer_id = CustomerId::new();
        let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();
        let placed_at = Utc::now();
        OrderRecord {
            order_id: AggregateId::new(),
            customer_id,
            status,
            lines,
            location: DeliveryLocation::new("Thamel", 27.7154, 85.3123),
            payment_method,
            subtotal,
            delivery_charge,
            grand_total: subtotal + delivery_charge,
            placed_at,
            history: vec![StatusEntry {
                status: OrderStatus::Created,
                at: placed_at,
                actor: Actor::Customer(customer_id),
            }],
        }
    }

    fn expense(amount: Money, category: ExpenseCategory) -> Expense {
        Expense {
            id: ExpenseId::new(),
            title: "entry".to_string(),
            amount,
            category,
            recorded_at: Utc::now(),
        }
    }

    fn tea_lines() -> Vec<OrderLine> {
        vec![OrderLine::new(
            "SKU-001",
            "Masala Tea",
            "beverages",
            2,
            Money::from_rupees(500),
        )]
    }

    #[test]
    fn empty_input_is_all_zeros() {
        let stats = compute_stats(&[], &[]);

        assert_eq!(stats.total_revenue, Money::zero());
        assert_eq!(stats.delivery_revenue, Money::zero());
        assert_eq!(stats.total_expenses, Money::zero());
        assert_eq!(stats.net_profit, Money::zero());
        assert_eq!(stats.total_orders, 0);
        assert!(stats.status_breakdown.is_empty());
        assert!(stats.category_breakdown.is_empty());
        assert!(stats.payment_breakdown.is_empty());
    }

    #[test]
    fn only_completed_orders_count_as_revenue() {
        // Same totals, different statuses: 5000 cancelled vs 5000 completed.
        let lines = vec![OrderLine::new(
            "SKU-009",
            "Gift Basket",
            "gifts",
            1,
            Money::from_rupees(5000),
        )];
        let orders = vec![
            record(
                OrderStatus::Cancelled,
                PaymentMethod::Card,
                lines.clone(),
                Money::zero(),
            ),
            record(
                OrderStatus::Completed,
                PaymentMethod::Card,
                lines,
                Money::zero(),
            ),
        ];

        let stats = compute_stats(&orders, &[]);

        assert_eq!(stats.total_revenue, Money::from_rupees(5000));
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.cancelled_orders, 1);
    }

    #[test]
    fn non_terminal_orders_are_pending_and_unrecognized() {
        let orders = vec![
            record(
                OrderStatus::Created,
                PaymentMethod::Esewa,
                tea_lines(),
                Money::from_rupees(150),
            ),
            record(
                OrderStatus::OutForDelivery,
                PaymentMethod::Esewa,
                tea_lines(),
                Money::from_rupees(150),
            ),
        ];

        let stats = compute_stats(&orders, &[]);

        assert_eq!(stats.total_revenue, Money::zero());
        assert_eq!(stats.pending_orders, 2);
    }

    #[test]
    fn delivery_revenue_tracks_completed_charges() {
        let orders = vec![
            record(
                OrderStatus::Completed,
                PaymentMethod::Khalti,
                tea_lines(),
                Money::from_rupees(150),
            ),
            record(
                OrderStatus::Completed,
                PaymentMethod::Khalti,
                tea_lines(),
                Money::zero(),
            ),
        ];

        let stats = compute_stats(&orders, &[]);

        assert_eq!(stats.delivery_revenue, Money::from_rupees(150));
        assert_eq!(stats.total_revenue, Money::from_rupees(2150));
    }

    #[test]
    fn net_profit_subtracts_expenses() {
        let orders = vec![record(
            OrderStatus::Completed,
            PaymentMethod::Esewa,
            tea_lines(),
            Money::zero(),
        )];
        let expenses = vec![
            expense(Money::from_rupees(300), ExpenseCategory::Fuel),
            expense(Money::from_rupees(200), ExpenseCategory::Packaging),
        ];

        let stats = compute_stats(&orders, &expenses);

        assert_eq!(stats.total_expenses, Money::from_rupees(500));
        assert_eq!(stats.net_profit, Money::from_rupees(500));
    }

    #[test]
    fn net_profit_can_go_negative() {
        let expenses = vec![expense(Money::from_rupees(700), ExpenseCategory::Salary)];

        let stats = compute_stats(&[], &expenses);

        assert_eq!(stats.net_profit, Money::from_rupees(-700));
    }

    #[test]
    fn breakdowns_exclude_zero_buckets() {
        let orders = vec![
            record(
                OrderStatus::Completed,
                PaymentMethod::Esewa,
                tea_lines(),
                Money::zero(),
            ),
            record(
                OrderStatus::Created,
                PaymentMethod::Card,
                tea_lines(),
                Money::from_rupees(150),
            ),
        ];

        let stats = compute_stats(&orders, &[]);

        // Only the two populated statuses appear.
        let labels: Vec<_> = stats
            .status_breakdown
            .iter()
            .map(|d| d.label.as_str())
            .collect();
        assert_eq!(labels, vec!["CREATED", "COMPLETED"]);

        // Card never completed, so only esewa shows up.
        let payment_labels: Vec<_> = stats
            .payment_breakdown
            .iter()
            .map(|d| d.label.as_str())
            .collect();
        assert_eq!(payment_labels, vec!["esewa"]);
    }

    #[test]
    fn category_breakdown_sums_line_totals_of_completed_orders() {
        let mixed = vec![
            OrderLine::new("SKU-001", "Masala Tea", "beverages", 2, Money::from_rupees(500)),
            OrderLine::new("SKU-002", "Sel Roti", "snacks", 1, Money::from_rupees(1200)),
        ];
        let orders = vec![
            record(
                OrderStatus::Completed,
                PaymentMethod::Khalti,
                mixed,
                Money::from_rupees(150),
            ),
            // Cancelled order contributes to no category.
            record(
                OrderStatus::Cancelled,
                PaymentMethod::Khalti,
                tea_lines(),
                Money::zero(),
            ),
        ];

        let stats = compute_stats(&orders, &[]);

        assert_eq!(
            stats.category_breakdown,
            vec![
                Distribution {
                    label: "beverages".to_string(),
                    value: Money::from_rupees(1000).minor(),
                },
                Distribution {
                    label: "snacks".to_string(),
                    value: Money::from_rupees(1200).minor(),
                },
            ]
        );
    }

    #[test]
    fn recomputation_is_deterministic() {
        let orders = vec![record(
            OrderStatus::Completed,
            PaymentMethod::Esewa,
            tea_lines(),
            Money::from_rupees(150),
        )];
        let expenses = vec![expense(Money::from_rupees(100), ExpenseCategory::Others)];

        let first = compute_stats(&orders, &expenses);
        let second = compute_stats(&orders, &expenses);

        assert_eq!(first.total_revenue, second.total_revenue);
        assert_eq!(first.status_breakdown, second.status_breakdown);
        assert_eq!(first.payment_breakdown, second.payment_breakdown);
    }

    #[test]
    fn percentage_guards_zero_divisor() {
        assert_eq!(percentage(1, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(0, 4), 0.0);
    }
}
