//! Prometheus text exposition (format 0.0.4).
//!
//! Rendering works on a [`MetricSnapshot`] list, so no registry lock is held
//! while the document is being built.

use std::fmt::Write;

use crate::error::Result;
use crate::point::{AggregatedPoint, HistogramPoint};
use crate::registry::MetricSnapshot;

/// Content type served on `/metrics`.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Comment lines written before the metric families.
#[derive(Debug, Clone)]
pub struct DocumentHeader<'a> {
    pub server_name: &'a str,
    pub server_addr: &'a str,
    /// Unix seconds.
    pub generated_at: u64,
}

/// Replace characters outside `[a-zA-Z0-9_:]` with `_`.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Sample value formatting.
///
/// `f64`'s `Display` is the shortest decimal that parses back to the same
/// value and never switches to exponent notation.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a full exposition document.
pub fn render(snapshot: &[MetricSnapshot], header: Option<&DocumentHeader<'_>>) -> Result<String> {
    let mut out = String::new();
    if let Some(h) = header {
        writeln!(out, "# {} - Custom Export", h.server_name)?;
        writeln!(out, "# Server: http://{}", h.server_addr)?;
        writeln!(out, "# Generated: {}", h.generated_at)?;
        out.push('\n');
    }
    for metric in snapshot {
        render_family(metric, &mut out)?;
    }
    Ok(out)
}

/// Render one metric family followed by a blank line.
pub fn render_family(metric: &MetricSnapshot, out: &mut String) -> Result<()> {
    let d = &metric.descriptor;
    let name = sanitize_metric_name(&d.name);

    if !d.description.is_empty() {
        writeln!(out, "# HELP {} {}", name, escape_help(&d.description))?;
    }
    writeln!(out, "# TYPE {} {}", name, d.kind.prom_type())?;

    for s in &metric.series {
        let labels = s.labels.render();
        match &s.point {
            AggregatedPoint::Sum(p) => {
                writeln!(out, "{}{} {}", name, labels, format_value(p.value))?;
            }
            AggregatedPoint::Histogram(h) => {
                let mut pairs = String::new();
                s.labels.write_pairs(&mut pairs);
                render_histogram(&name, &labels, &pairs, h, out)?;
            }
        }
    }
    out.push('\n');
    Ok(())
}

fn render_histogram(
    name: &str,
    labels: &str,
    pairs: &str,
    h: &HistogramPoint,
    out: &mut String,
) -> Result<()> {
    let sep = if pairs.is_empty() { "" } else { "," };
    for (i, b) in h.boundaries.iter().enumerate() {
        writeln!(
            out,
            "{}_bucket{{le=\"{}\"{}{}}} {}",
            name,
            format_value(*b),
            sep,
            pairs,
            h.cumulative(i)
        )?;
    }
    writeln!(out, "{}_bucket{{le=\"+Inf\"{}{}}} {}", name, sep, pairs, h.count)?;
    writeln!(out, "{}_count{} {}", name, labels, h.count)?;
    writeln!(out, "{}_sum{} {}", name, labels, format_value(h.sum))?;
    Ok(())
}
