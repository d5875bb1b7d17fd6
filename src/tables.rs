use chrono::TimeZone;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{record::PriceRecord, statistics::DayStatistics},
    quantity::price::CentsPerKilowattHour,
};

const UNAVAILABLE: &str = "unavailable";

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

#[must_use]
pub fn build_statistics_table(statistics: Option<DayStatistics>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Price", "Hour"]);
    add_statistics_rows(&mut table, "", statistics);
    table
}

#[must_use]
pub fn build_summary_table(
    current_price: Option<CentsPerKilowattHour>,
    today: Option<DayStatistics>,
    tomorrow: Option<DayStatistics>,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Price", "Hour"]);
    table.add_row(vec![
        Cell::new("Now"),
        current_price.map_or_else(unavailable_cell, |price| {
            Cell::new(price).set_alignment(CellAlignment::Right)
        }),
        Cell::new(""),
    ]);
    add_statistics_rows(&mut table, "Today ", today);
    add_statistics_rows(&mut table, "Tomorrow ", tomorrow);
    table
}

fn add_statistics_rows(table: &mut Table, prefix: &str, statistics: Option<DayStatistics>) {
    let Some(statistics) = statistics else {
        table.add_row(vec![Cell::new(prefix.trim_end()), unavailable_cell(), Cell::new("")]);
        return;
    };
    table.add_row(vec![
        Cell::new(format!("{prefix}min")),
        Cell::new(statistics.min_price).set_alignment(CellAlignment::Right).fg(Color::Green),
        Cell::new(format_hour(statistics.min_hour)),
    ]);
    table.add_row(vec![
        Cell::new(format!("{prefix}max")),
        Cell::new(statistics.max_price).set_alignment(CellAlignment::Right).fg(Color::Red),
        Cell::new(format_hour(statistics.max_hour)),
    ]);
}

/// Hourly prices of a day with the cheapest and the most expensive hours highlighted.
#[must_use]
pub fn build_prices_table<Tz: TimeZone>(prices: &[PriceRecord], time_zone: &Tz) -> Table
where
    Tz::Offset: std::fmt::Display,
{
    let statistics = DayStatistics::from_records(prices, time_zone);
    let mut table = new_table();
    table.set_header(vec!["Start", "Rank", "Excl. tax", "Incl. tax"]);
    for record in prices {
        let price = record.display_price();
        let color = match statistics {
            Some(statistics) if price == statistics.min_price => Color::Green,
            Some(statistics) if price == statistics.max_price => Color::Red,
            _ => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(record.local_time(time_zone).format("%H:%M")),
            Cell::new(record.rank)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(CentsPerKilowattHour::from(record.price_excluding_tax))
                .set_alignment(CellAlignment::Right),
            Cell::new(price).set_alignment(CellAlignment::Right).fg(color),
        ]);
    }
    table
}

fn unavailable_cell() -> Cell {
    Cell::new(UNAVAILABLE).add_attribute(Attribute::Dim)
}
