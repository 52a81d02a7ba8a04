use average::Mean;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{core::summary::SessionSummary, quantity::cost::Cost};

#[must_use]
pub fn build_summary_table(summaries: &[SessionSummary]) -> Table {
    let mean_cost = mean_total_cost(summaries);

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec![
        "Session", "Date", "Start", "End", "Energy", "High tier", "Energy cost", "Net cost",
        "Excl. VAT", "Incl. VAT",
    ]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.session_id).add_attribute(Attribute::Dim),
            Cell::new(summary.first_at.format("%b %d")),
            Cell::new(summary.first_at.format("%H:%M")),
            Cell::new(summary.last_at.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.3}", summary.energy)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", summary.high_tier_energy))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", summary.energy_cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", summary.net_cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", summary.total_excluding_vat))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", summary.total_including_vat))
                .set_alignment(CellAlignment::Right)
                .fg(if summary.total_including_vat > mean_cost {
                    Color::Red
                } else {
                    Color::Green
                }),
        ]);
    }
    if let Some(total) = SessionSummary::total(summaries, "Total") {
        table.add_row(vec![
            Cell::new(total.session_id).add_attribute(Attribute::Bold),
            Cell::new(total.first_at.format("%b %d")),
            Cell::new(""),
            Cell::new(total.last_at.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.3}", total.energy))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{:.3}", total.high_tier_energy))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", total.energy_cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", total.net_cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", total.total_excluding_vat))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2} {}", total.total_including_vat.0, total.currency))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
        ]);
    }
    table
}

fn mean_total_cost(summaries: &[SessionSummary]) -> Cost {
    let estimate: Mean =
        summaries.iter().map(|summary| summary.total_including_vat.0).collect();
    if estimate.is_empty() { Cost::ZERO } else { estimate.mean().into() }
}
