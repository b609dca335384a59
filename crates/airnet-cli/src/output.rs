//! Plain-text tables and JSON output.

use serde::Serialize;
use std::io::Write;

/// Left-aligned text table sized to its widest cell per column.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_to(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for line in std::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let render = |line: &[String]| -> String {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = line.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}", width = widths[i])
                })
                .collect();
            cells.join("  ").trim_end().to_string()
        };

        writeln!(out, "{}", render(&self.headers))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("  "))?;
        for row in &self.rows {
            writeln!(out, "{}", render(row))?;
        }
        Ok(())
    }
}

/// The serde name of a unit enum variant, e.g. `duopoly`.
pub fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => "?".to_string(),
    }
}

/// Thousands-separated integer rendering of a float.
pub fn grouped(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

pub fn fixed(value: f64, places: usize) -> String {
    format!("{value:.places$}")
}

pub fn optional(value: Option<f64>, places: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| fixed(v, places))
}

pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airnet_core::CompetitionLevel;

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let mut table = Table::new(["route", "asm"]);
        table.row(["JFK-LAX", "470,250"]);
        table.row(["BOS-JFK", "14"]);

        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "route    asm");
        assert_eq!(lines[1], "-------  -------");
        assert_eq!(lines[3], "BOS-JFK  14");
    }

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(grouped(0.0), "0");
        assert_eq!(grouped(999.4), "999");
        assert_eq!(grouped(1_234_567.0), "1,234,567");
        assert_eq!(grouped(-4_500.0), "-4,500");
        assert_eq!(grouped(f64::NAN), "-");
    }

    #[test]
    fn label_uses_serde_names() {
        assert_eq!(label(&CompetitionLevel::Duopoly), "duopoly");
    }
}
