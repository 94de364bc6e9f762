use crate::bench::{Phase, Stopwatch, per_second};
use crate::store::{ResultSet, Value};
use std::io::{self, Write};
use std::time::Duration;

/// Counts and timings of one run.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub persons: u64,
    pub hubs: u64,
    pub links: u64,
    pub node_commits: u64,
    pub plan_bytes: usize,
    pub durations: Vec<(Phase, Duration)>,
}

impl Summary {
    pub fn with_timings(mut self, stopwatch: &Stopwatch) -> Self {
        self.durations = stopwatch
            .timings()
            .iter()
            .map(|t| (t.phase, t.elapsed()))
            .collect();
        self
    }

    pub fn duration(&self, phase: Phase) -> Option<Duration> {
        self.durations
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, d)| *d)
    }

    pub fn persons_per_sec(&self) -> Option<f64> {
        self.duration(Phase::Generate)
            .and_then(|d| per_second(self.persons, d))
    }

    pub fn links_per_sec(&self) -> Option<f64> {
        self.duration(Phase::LoadLinks)
            .and_then(|d| per_second(self.links, d))
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("persons built", self.persons.to_string()),
            ("hub persons", self.hubs.to_string()),
            ("total connections", self.links.to_string()),
            ("person commits", self.node_commits.to_string()),
            ("build persons per/sec", rate(self.persons_per_sec())),
            ("build edges per/sec", rate(self.links_per_sec())),
            ("build persons duration", millis(self.duration(Phase::Generate))),
            ("insert persons duration", millis(self.duration(Phase::LoadPersons))),
            ("build edges duration", millis(self.duration(Phase::LoadLinks))),
            (
                "search connections duration",
                millis(self.duration(Phase::ShowConnections)),
            ),
            ("search links duration", millis(self.duration(Phase::SearchLinks))),
            ("link plan memory", format!("{} KiB", self.plan_bytes / 1024)),
        ]
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rows: Vec<Vec<String>> = self
            .rows()
            .into_iter()
            .map(|(label, value)| vec![label.to_string(), value])
            .collect();
        render_table(out, &["", "Counts/Duration"], &rows, &[false, true])
    }

    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["metric", "value"])?;
        for (label, value) in self.rows() {
            writer.write_record([label, value.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "undefined".to_string(),
    }
}

fn millis(value: Option<Duration>) -> String {
    match value {
        Some(d) => format!("{}ms", d.as_millis()),
        None => "-".to_string(),
    }
}

pub fn render_result_set<W: Write>(out: &mut W, title: &str, result: &ResultSet) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    let headers: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let numeric: Vec<bool> = (0..headers.len())
        .map(|i| {
            result
                .rows
                .iter()
                .all(|row| matches!(row.get(i), Some(Value::Int(_) | Value::Real(_) | Value::Null)))
        })
        .collect();
    render_table(out, &headers, &rows, &numeric)?;
    writeln!(out, "{} row(s)", result.len())
}

pub fn render_info<W: Write>(out: &mut W, info: &[(String, i64)]) -> io::Result<()> {
    writeln!(out, "\nStore info")?;
    let rows: Vec<Vec<String>> = info
        .iter()
        .map(|(key, value)| vec![key.clone(), value.to_string()])
        .collect();
    render_table(out, &["key", "value"], &rows, &[false, true])
}

/// Boxed table. `right[i]` right-aligns column `i`.
fn render_table<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
    right: &[bool],
) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+";

    writeln!(out, "{border}")?;
    writeln!(out, "{}", table_line(headers, &widths, right))?;
    writeln!(out, "{border}")?;
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", table_line(&cells, &widths, right))?;
    }
    writeln!(out, "{border}")
}

fn table_line(cells: &[&str], widths: &[usize], right: &[bool]) -> String {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if right.get(i).copied().unwrap_or(false) {
            line.push_str(&format!("| {cell:>width$} "));
        } else {
            line.push_str(&format!("| {cell:<width$} "));
        }
    }
    line + "|"
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary() -> Summary {
        Summary {
            persons: 500,
            hubs: 5,
            links: 1000,
            node_commits: 4,
            plan_bytes: 4096,
            durations: vec![
                (Phase::Generate, Duration::from_millis(250)),
                (Phase::LoadPersons, Duration::from_millis(40)),
                (Phase::LoadLinks, Duration::from_secs(2)),
            ],
        }
    }

    fn value<'a>(rows: &'a [(&'static str, String)], label: &str) -> &'a str {
        rows.iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_rates() {
        let s = summary();

        assert_relative_eq!(2000.0, s.persons_per_sec().unwrap());
        assert_relative_eq!(500.0, s.links_per_sec().unwrap());
    }

    #[test]
    fn test_zero_duration_rate_is_undefined() {
        let mut s = summary();
        s.durations[0].1 = Duration::ZERO;

        assert_eq!(None, s.persons_per_sec());
        assert_eq!("undefined", value(&s.rows(), "build persons per/sec"));
    }

    #[test]
    fn test_rows() {
        let rows = summary().rows();

        assert_eq!("500", value(&rows, "persons built"));
        assert_eq!("1000", value(&rows, "total connections"));
        assert_eq!("2000.00", value(&rows, "build persons per/sec"));
        assert_eq!("2000ms", value(&rows, "build edges duration"));
        assert_eq!("-", value(&rows, "search links duration"));
        assert_eq!("4 KiB", value(&rows, "link plan memory"));
    }

    #[test]
    fn test_render_table() {
        let mut out = Vec::new();
        summary().render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("+-"));
        assert!(lines[1].contains("Counts/Duration"));
        assert!(lines.iter().any(|l| l.contains("| persons built ") && l.ends_with(" 500 |")));
        let width = lines[0].len();
        assert!(lines.iter().all(|l| l.len() == width));
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        summary().write_csv(&mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(summary().rows().len(), records.len());
        assert_eq!("persons built", &records[0][0]);
        assert_eq!("500", &records[0][1]);
    }

    #[test]
    fn test_render_result_set() {
        let result = ResultSet {
            columns: vec!["username".into(), "links".into()],
            rows: vec![
                vec![Value::from("ann.lee"), Value::Int(75)],
                vec![Value::from("bo"), Value::Int(1200)],
            ],
        };
        let mut out = Vec::new();
        render_result_set(&mut out, "Total number of links", &result).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total number of links"));
        assert!(text.contains("| ann.lee  |    75 |"));
        assert!(text.contains("2 row(s)"));
    }

    #[test]
    fn test_render_info() {
        let mut out = Vec::new();
        render_info(&mut out, &[("nodes".to_string(), 12)]).unwrap();

        assert!(String::from_utf8(out).unwrap().contains("| nodes |    12 |"));
    }
}
