use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use kuub_core::aggregation::{MEAN_EXTRA_BINS, ORDER_COUNT, SUM_EXTRA_BINS, SUM_EXTRA_M3};
use kuub_core::{FormatConfig, Report, ReportConfig};
use kuub_parser::formats::epoch_days_to_date;
use kuub_parser::schema::LOCATION_ID;
use kuub_parser::LoadedOrders;
use polars::prelude::{AnyValue, Column, DataType, PolarsResult};

const BAR_WIDTH: usize = 40;

pub fn report(report: &Report, config: &ReportConfig) -> Result<String> {
    let format = &config.format;
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str("Extra afval rapport\n");
    match report.date_range {
        Some(range) => out.push_str(&format!(
            "Periode: {} t/m {}\n",
            format.date(range.start),
            format.date(range.end)
        )),
        None => out.push_str("Periode: geen leesbare ophaaldata\n"),
    }
    out.push_str(&format!(
        "Signalering: > {} extra bakken en > {} m³\n\n",
        format.number(report.thresholds.min_extra_bins),
        format.number(report.thresholds.min_extra_m3)
    ));

    let mut overview = table(vec!["Kengetal", "Waarde"]);
    let undated = if summary.undated_count > 0 {
        format!(
            "{} ({} m³)",
            format.count(summary.undated_count),
            format.number(summary.undated_extra_m3)
        )
    } else {
        format.count(0)
    };
    for (label, value) in [
        ("Totale extra kuub", format!("{} m³", format.number(summary.total_extra_m3))),
        ("Gemiddeld per order", format!("{} m³", format.optional_number(summary.mean_extra_m3))),
        ("Gemiddelde extra bakken", format.optional_number(summary.mean_extra_bins)),
        ("Aantal orders", format.count(summary.order_count)),
        ("Geflagde orders", format.count(summary.flagged_count)),
        ("Orders zonder bakvolume", format.count(summary.undefined_bins_count)),
        ("Orders zonder ophaaldatum", undated),
    ] {
        overview.add_row(vec![Cell::new(label), right(value)]);
    }
    out.push_str(&format!("{overview}\n\n"));

    out.push_str("Totaal extra m³ per dag\n");
    let mut daily = table(vec!["Ophaaldatum", "Extra m³"]);
    for point in &report.daily {
        daily.add_row(vec![
            Cell::new(format.date(point.date)),
            right(format.number(point.extra_m3)),
        ]);
    }
    out.push_str(&format!("{daily}\n"));
    let daily_bars: Vec<(String, f64)> = report
        .daily
        .iter()
        .map(|point| (format.date(point.date), point.extra_m3))
        .collect();
    out.push_str(&bar_chart(&daily_bars, |value| format.number(value)));
    out.push('\n');

    out.push_str(&format!(
        "Top {} klanten met meeste extra afval\n",
        config.top_customers
    ));
    let mut customers = table(vec!["Klantnaam", "Extra m³"]);
    for total in &report.customers {
        customers.add_row(vec![
            Cell::new(total.customer.as_deref().unwrap_or("-")),
            right(format.number(total.extra_m3)),
        ]);
    }
    out.push_str(&format!("{customers}\n"));
    let customer_bars: Vec<(String, f64)> = report
        .customers
        .iter()
        .map(|total| {
            (
                total.customer.clone().unwrap_or_else(|| "-".to_string()),
                total.extra_m3,
            )
        })
        .collect();
    out.push_str(&bar_chart(&customer_bars, |value| format.number(value)));
    out.push('\n');

    out.push_str("Locaties met herhaald extra afval\n");
    let mut locations = table(vec![
        LOCATION_ID,
        ORDER_COUNT,
        MEAN_EXTRA_BINS,
        SUM_EXTRA_BINS,
        SUM_EXTRA_M3,
    ]);
    for summary in &report.locations {
        locations.add_row(vec![
            Cell::new(summary.location.as_deref().unwrap_or("-")),
            right(summary.order_count.to_string()),
            right(format.optional_number(summary.mean_extra_bins)),
            right(format.number(summary.total_extra_bins)),
            right(format.number(summary.total_extra_m3)),
        ]);
    }
    out.push_str(&format!("{locations}\n"));
    let location_bars: Vec<(String, f64)> = report
        .locations
        .iter()
        .take(config.top_locations_chart)
        .map(|summary| {
            (
                summary.location.clone().unwrap_or_else(|| "-".to_string()),
                summary.order_count as f64,
            )
        })
        .collect();
    out.push_str(&bar_chart(&location_bars, |value| format.number_with(value, 0)));
    out.push('\n');

    out.push_str("Geflagde orders\n");
    if report.export.height() == 0 {
        out.push_str("Geen geflagde orders.\n");
    } else {
        out.push_str(&format!("{}\n", frame_table(report, format)?));
    }

    Ok(out)
}

pub fn inspect(loaded: &LoadedOrders) -> String {
    let mut out = format!(
        "Bron: {}\nKoprij: {} (via {})\nDatarijen: {}\n",
        loaded.source,
        loaded.header_row,
        loaded.locator,
        loaded.row_count()
    );

    let mut columns = table(vec!["#", "Kolom", "Type", "Leeg"]);
    for (idx, column) in loaded.frame.get_columns().iter().enumerate() {
        columns.add_row(vec![
            right(idx.to_string()),
            Cell::new(column.name().as_str()),
            Cell::new(column.dtype().to_string()),
            right(column.null_count().to_string()),
        ]);
    }
    out.push_str(&format!("{columns}\n"));
    out
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

fn frame_table(report: &Report, format: &FormatConfig) -> PolarsResult<Table> {
    let frame = &report.export;
    let header: Vec<&str> = frame.get_column_names_str();
    let mut rendered = table(header);

    let columns = frame
        .get_columns()
        .iter()
        .map(|column| column_texts(column, format))
        .collect::<PolarsResult<Vec<_>>>()?;

    for row in 0..frame.height() {
        rendered.add_row(
            columns
                .iter()
                .map(|values| Cell::new(values[row].as_str()))
                .collect::<Vec<_>>(),
        );
    }
    Ok(rendered)
}

fn column_texts(column: &Column, format: &FormatConfig) -> PolarsResult<Vec<String>> {
    Ok(match column.dtype() {
        DataType::Date => column
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|days| {
                days.and_then(epoch_days_to_date)
                    .map(|date| format.date(date))
                    .unwrap_or_default()
            })
            .collect(),
        DataType::Float64 => column
            .f64()?
            .into_iter()
            .map(|value| value.map(|value| format.number(value)).unwrap_or_default())
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| value.unwrap_or_default().to_string())
            .collect(),
        _ => (0..column.len())
            .map(|idx| match column.get(idx) {
                Ok(AnyValue::Null) | Err(_) => String::new(),
                Ok(value) => value.to_string(),
            })
            .collect(),
    })
}

/// Horizontal text bars scaled to the largest value.
fn bar_chart(rows: &[(String, f64)], render_value: impl Fn(f64) -> String) -> String {
    let max = rows.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let length = if max > 0.0 && *value > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let padding = label_width - label.chars().count();
        out.push_str(&format!(
            "{label}{} │{} {}\n",
            " ".repeat(padding),
            "█".repeat(length),
            render_value(*value)
        ));
    }
    out
}
