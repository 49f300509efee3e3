//! Plain-text receipt rendering
//!
//! Renders a [`Receipt`] as a terminal table: one row per priced line, one
//! row per discount, followed by a right-aligned summary block with the
//! subtotal, savings and total.

use std::{fmt::Write, io};

use rusty_money::Money;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{products::ProductUnit, receipt::Receipt};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output sink rejected a write.
    #[error("IO error")]
    IO,
}

/// Write the receipt as a table followed by a summary block.
///
/// # Errors
///
/// Returns [`RenderError::IO`] if the sink rejects a write.
pub fn write_receipt(mut out: impl io::Write, receipt: &Receipt<'_>) -> Result<(), RenderError> {
    let mut builder = Builder::default();
    let mut color_ops: Vec<(usize, Color)> = Vec::new();

    builder.push_record(["Item", "Qty", "Unit Price", "Total"]);

    let mut current_row = 1; // header is row 0

    for line in receipt.lines() {
        builder.push_record([
            line.product().name().to_string(),
            quantity_display(line),
            format!("{}", line.unit_price()),
            format!("{}", line.total()),
        ]);

        current_row += 1;
    }

    let discount_boundary = current_row;

    for discount in receipt.discounts() {
        builder.push_record([
            format!("{} ({})", discount.description(), discount.product().name()),
            String::new(),
            String::new(),
            format!("{}", discount.amount()),
        ]);

        color_ops.push((current_row, Color::FG_GREEN));
        current_row += 1;
    }

    write_receipt_table(&mut out, builder, discount_boundary, color_ops)?;
    write_receipt_summary(&mut out, receipt)?;

    Ok(())
}

/// Per-kilo quantities print with their fractional part, per-each as a count.
fn quantity_display(line: &crate::receipt::ReceiptLine<'_>) -> String {
    match line.product().unit() {
        ProductUnit::Each => format!("{}", line.quantity().normalize()),
        ProductUnit::Kilo => format!("{} kg", line.quantity().normalize()),
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    discount_boundary: usize,
    color_ops: Vec<(usize, Color)>,
) -> Result<(), RenderError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));
    let row_count = table.count_rows();

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    if discount_boundary > 1 && discount_boundary < row_count {
        theme.insert_horizontal_line(discount_boundary, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..4), Alignment::right());

    for (row, color) in color_ops {
        table.modify((row, 3), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| RenderError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), RenderError> {
    let subtotal = receipt.subtotal();
    let total = receipt.total();
    let savings = receipt.savings();

    let subtotal_label = " Subtotal:";
    let total_label = " \x1b[1mTotal:\x1b[0m";
    let savings_label = " Savings:";

    let subtotal_val = format!("{subtotal}  ");
    let total_val = format!("{total}  ");
    let savings_val = format!("{savings}  ");

    let label_width = visible_width(subtotal_label)
        .max(visible_width(total_label))
        .max(visible_width(savings_label));

    let value_width = subtotal_val
        .len()
        .max(total_val.len())
        .max(savings_val.len());

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;

    if savings != Money::from_minor(0, receipt.currency()) {
        write_summary_line(out, savings_label, &savings_val, label_width, value_width)?;
    }

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    writeln!(out).map_err(|_err| RenderError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F. Each run
/// of consecutive border characters gets a single grey escape sequence, so
/// cell content is left untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), RenderError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| RenderError::IO)
}
