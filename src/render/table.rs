// Tabular output: Org-mode text tables and CSV. Both stream rows straight from
// the combiner; they differ only in cell formatting and row delimiting.

use std::io::Write;

use tracing::instrument;

use super::Formatter;
use crate::combine::{check_alignment, combine_results, get_header};
use crate::config::ReportContext;
use crate::error::Result;
use crate::models::{ResultSet, SeriesSource};

fn org_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn csv_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}

/// Org-mode table. Columns are not aligned; Org realigns them on load.
pub struct OrgTableFormatter<'a, W: Write> {
    out: W,
    ctx: &'a ReportContext,
}

impl<'a, W: Write> OrgTableFormatter<'a, W> {
    pub fn new(out: W, ctx: &'a ReportContext) -> Self {
        Self { out, ctx }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    #[instrument(skip_all, fields(formatter = "org_table", results = results.len()))]
    pub fn write_table<S: SeriesSource>(&mut self, results: &[S]) -> Result<()> {
        let Some(first) = results.first() else {
            return Ok(());
        };
        if first.is_empty() {
            writeln!(self.out, "{} -- empty", first.meta("NAME").unwrap_or_default())?;
            return Ok(());
        }
        check_alignment(results)?;

        let keys = self.ctx.settings.data_set_names();
        let header = get_header(results, &keys);
        writeln!(self.out, "| {} |", header.join(" | "))?;
        let rule: Vec<String> = header.iter().map(|h| "-".repeat(h.chars().count())).collect();
        writeln!(self.out, "|-{}-|", rule.join("-+-"))?;

        for row in combine_results(results, &keys) {
            let row = row?;
            let cells: Vec<String> = std::iter::once(Some(row.x))
                .chain(row.values)
                .map(org_cell)
                .collect();
            writeln!(self.out, "| {} |", cells.join(" | "))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Formatter for OrgTableFormatter<'_, W> {
    fn format(&mut self, results: &[ResultSet]) -> Result<()> {
        self.write_table(results)
    }
}

pub struct CsvFormatter<'a, W: Write> {
    out: W,
    ctx: &'a ReportContext,
}

impl<'a, W: Write> CsvFormatter<'a, W> {
    pub fn new(out: W, ctx: &'a ReportContext) -> Self {
        Self { out, ctx }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    #[instrument(skip_all, fields(formatter = "csv", results = results.len()))]
    pub fn write_table<S: SeriesSource>(&mut self, results: &[S]) -> Result<()> {
        let Some(first) = results.first() else {
            return Ok(());
        };
        if first.is_empty() {
            return Ok(());
        }
        check_alignment(results)?;

        let keys = self.ctx.settings.data_set_names();
        let mut writer = csv::Writer::from_writer(&mut self.out);
        writer.write_record(get_header(results, &keys))?;
        for row in combine_results(results, &keys) {
            let row = row?;
            writer.write_record(
                std::iter::once(Some(row.x))
                    .chain(row.values)
                    .map(csv_cell),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Formatter for CsvFormatter<'_, W> {
    fn format(&mut self, results: &[ResultSet]) -> Result<()> {
        self.write_table(results)
    }
}
