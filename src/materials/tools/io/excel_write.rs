use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::materials::tools::error::{Result, ToolError};
use crate::materials::tools::matrix::{ComparisonMatrix, Layout};

/// Sheet name used for entity-major listings.
pub const LISTING_SHEET: &str = "Materials Data";
/// Sheet name used for property-major comparisons.
pub const COMPARISON_SHEET: &str = "Materials Comparison";

const LISTING_MIN_WIDTH: usize = 12;
const LISTING_MAX_WIDTH: usize = 50;
const LISTING_ROW_HEIGHT: f64 = 40.0;

const LABEL_COLUMN_WIDTH: f64 = 30.0;
const ENTITY_COLUMN_WIDTH: f64 = 25.0;
const CAPTION_ROW_HEIGHT: f64 = 30.0;
const PROPERTY_ROW_HEIGHT: f64 = 25.0;

/// Writes the matrix to a single-sheet workbook at `path`.
pub fn write_workbook(path: &Path, matrix: &ComparisonMatrix) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    match matrix.layout() {
        Layout::EntityMajor => write_listing(worksheet, matrix)?,
        Layout::PropertyMajor => write_comparison(worksheet, matrix)?,
    }

    workbook
        .save(path)
        .map_err(|err| ToolError::Render(format!("cannot write {}: {err}", path.display())))
}

fn write_listing(worksheet: &mut Worksheet, matrix: &ComparisonMatrix) -> Result<()> {
    worksheet.set_name(LISTING_SHEET)?;

    let border_color = Color::RGB(0xB4B4B4);
    let header_format = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_font_color(Color::Black)
        .set_background_color(Color::RGB(0xDDEBF7))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    let cell_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);

    let header = matrix.header();
    let rows = matrix.rows();

    for (col_idx, label) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, label, &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string_with_format(
                (row_idx + 1) as u32,
                col_idx as u16,
                cell,
                &cell_format,
            )?;
        }
        worksheet.set_row_height((row_idx + 1) as u32, LISTING_ROW_HEIGHT)?;
    }

    for (col_idx, label) in header.iter().enumerate() {
        let cells = rows
            .iter()
            .filter_map(|row| row.get(col_idx))
            .map(String::as_str);
        let width = listing_column_width(label, cells);
        worksheet.set_column_width(col_idx as u16, width as f64)?;
    }

    if !header.is_empty() {
        let col_end = (header.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, rows.len() as u32, col_end)?;
    }
    worksheet.set_freeze_panes(1, 1)?;
    Ok(())
}

fn write_comparison(worksheet: &mut Worksheet, matrix: &ComparisonMatrix) -> Result<()> {
    worksheet.set_name(COMPARISON_SHEET)?;

    let border_color = Color::Black;
    let caption_format = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x366092))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    let label_format = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    let data_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);

    let header = matrix.header();
    for (col_idx, caption) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, caption, &caption_format)?;
    }
    worksheet.set_row_height(0, CAPTION_ROW_HEIGHT)?;

    for (row_idx, row) in matrix.rows().iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let format = if col_idx == 0 {
                &label_format
            } else {
                &data_format
            };
            worksheet.write_string_with_format(sheet_row, col_idx as u16, cell, format)?;
        }
        worksheet.set_row_height(sheet_row, PROPERTY_ROW_HEIGHT)?;
    }

    worksheet.set_column_width(0, LABEL_COLUMN_WIDTH)?;
    for col_idx in 1..header.len() {
        worksheet.set_column_width(col_idx as u16, ENTITY_COLUMN_WIDTH)?;
    }
    worksheet.set_freeze_panes(1, 1)?;
    Ok(())
}

/// Width of a listing column: the longest entry plus two, where only the
/// first line of a cell counts and cells are capped at the maximum width,
/// clamped to `[12, 50]`.
pub fn listing_column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    let longest = cells
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            let first_line = cell.split('\n').next().unwrap_or_default();
            first_line.chars().count().min(LISTING_MAX_WIDTH)
        })
        .fold(header.chars().count(), usize::max);
    (longest + 2).clamp(LISTING_MIN_WIDTH, LISTING_MAX_WIDTH)
}
