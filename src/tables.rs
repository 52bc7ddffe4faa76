use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::estimate::{Breakdown, Confidence, Estimate, Party, Status},
    quantity::Cents,
};

fn base_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

/// One-line verdict: status, confidence, and the headline numbers.
#[must_use]
pub fn summary_table(estimate: &Estimate) -> Table {
    let status_color = match estimate.status {
        Status::Ok => Color::Green,
        Status::Approximate => Color::DarkYellow,
        Status::NotComputable | Status::NotImplemented => Color::Red,
    };
    let confidence_color = match estimate.confidence {
        Confidence::High => Color::Green,
        Confidence::Medium => Color::DarkYellow,
        Confidence::Low => Color::Red,
    };
    let money = |amount: Option<Cents>| {
        amount.map_or_else(|| Cell::new("n/a").add_attribute(Attribute::Dim), Cell::new)
    };

    let mut table = base_table();
    table.set_header(vec!["Status", "Confidence", "Annual", "Monthly", "Reason"]);
    table.add_row(vec![
        Cell::new(estimate.status).fg(status_color).add_attribute(Attribute::Bold),
        Cell::new(estimate.confidence).fg(confidence_color),
        money(estimate.annual_cost).set_alignment(CellAlignment::Right),
        money(estimate.monthly_cost).set_alignment(CellAlignment::Right),
        estimate.reason.as_deref().map_or_else(|| Cell::new("").add_attribute(Attribute::Dim), Cell::new),
    ]);
    table
}

/// The flat breakdown with the REP/TDSP split.
#[must_use]
pub fn breakdown_table(breakdown: &Breakdown) -> Table {
    let mut table = base_table();
    table.set_header(vec!["Line", "Party", "Amount"]);
    for line in &breakdown.lines {
        let amount_color = if line.amount < Cents::ZERO { Color::Green } else { Color::Reset };
        table.add_row(vec![
            Cell::new(&line.label),
            Cell::new(match line.party {
                Party::Rep => "REP",
                Party::Tdsp => "TDSP",
            })
            .add_attribute(Attribute::Dim),
            Cell::new(line.amount).set_alignment(CellAlignment::Right).fg(amount_color),
        ]);
    }
    table.add_row(vec![
        Cell::new("REP subtotal").add_attribute(Attribute::Dim),
        Cell::new("REP").add_attribute(Attribute::Dim),
        Cell::new(breakdown.rep_total).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("TDSP subtotal").add_attribute(Attribute::Dim),
        Cell::new("TDSP").add_attribute(Attribute::Dim),
        Cell::new(breakdown.tdsp_total).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(breakdown.total).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
    ]);
    table
}
