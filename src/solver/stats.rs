use std::collections::HashMap;

use prettytable::{Cell, Row, Table};

use crate::model::expr::ConstraintDescriptor;

pub type ConstraintId = usize;

#[derive(Debug, Clone, Default)]
pub struct PerConstraintStats {
    /// How many times the constraint was evaluated at a search node.
    pub revisions: u64,
    /// How many of those evaluations pruned the node outright.
    pub rejections: u64,
    pub time_spent_micros: u64,
}

/// Counters accumulated over one solving session.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub backtracks: u64,
    /// Incumbent models found during branch-and-bound, including the final one.
    pub models_found: u64,
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
}

pub fn render_stats_table(stats: &SearchStats, descriptors: &[ConstraintDescriptor]) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint Type"),
        Cell::new("ID"),
        Cell::new("Description"),
        Cell::new("Evaluations"),
        Cell::new("Rejections"),
        Cell::new("Time / Call (µs)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted_stats: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();
    sorted_stats.sort_by_key(|entry| entry.1.time_spent_micros);

    for (constraint_id, constraint_stats) in sorted_stats {
        let descriptor = &descriptors[*constraint_id];
        let avg_time = if constraint_stats.revisions > 0 {
            constraint_stats.time_spent_micros as f64 / constraint_stats.revisions as f64
        } else {
            0.0
        };

        table.add_row(Row::new(vec![
            Cell::new(&descriptor.name),
            Cell::new(&constraint_id.to_string()),
            Cell::new(&descriptor.description),
            Cell::new(&constraint_stats.revisions.to_string()),
            Cell::new(&constraint_stats.rejections.to_string()),
            Cell::new(&format!("{:.2}", avg_time)),
            Cell::new(&format!(
                "{:.2}",
                constraint_stats.time_spent_micros as f64 / 1000.0
            )),
        ]));
    }

    table.to_string()
}
