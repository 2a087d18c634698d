//! Chart descriptions and the renderers that draw them.
//!
//! A `ChartSpec` serializes to a Chart.js configuration object. `HtmlRenderer` collects the
//! charts and the summary lines and turns them into a standalone HTML page that loads Chart.js
//! from a CDN.

use crate::error::Res;
use crate::report::{Report, WeekdaySeries, WEEKDAY_LABELS};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const SALES_COLOR: &str = "#2e7d32";
const SALES_FILL: &str = "rgba(46, 125, 50, 0.2)";
const EXPENSES_COLOR: &str = "#c62828";
const EXPENSES_FILL: &str = "rgba(198, 40, 40, 0.2)";
const CATEGORY_COLOR: &str = "#2962ff";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

/// Where a chart is drawn. The dashboard holds at most one chart per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Sales against expenses by day of the week.
    Comparison,
    /// Expenses by category.
    Categories,
}

serde_plain::derive_display_from_serialize!(Slot);

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Comparison, Slot::Categories];

    fn element_id(self) -> &'static str {
        match self {
            Slot::Comparison => "comparison-chart",
            Slot::Categories => "categories-chart",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Slot::Comparison => "Sales vs. expenses by weekday",
            Slot::Categories => "Expenses by category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A Chart.js configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
}

impl ChartSpec {
    /// Sales and expenses per weekday as two lines.
    pub fn comparison(report: &Report) -> Self {
        let series = |label: &str, values: &WeekdaySeries, border: &str, fill: &str| {
            Dataset {
                label: label.to_string(),
                data: values.values().iter().map(|a| a.to_f64()).collect(),
                border_color: Some(border.to_string()),
                background_color: fill.to_string(),
                fill: Some(true),
            }
        };
        Self {
            kind: ChartKind::Line,
            data: ChartData {
                labels: WEEKDAY_LABELS.iter().map(|l| l.to_string()).collect(),
                datasets: vec![
                    series(
                        "Sales",
                        &report.weekday_sales,
                        SALES_COLOR,
                        SALES_FILL,
                    ),
                    series(
                        "Expenses",
                        &report.weekday_expenses,
                        EXPENSES_COLOR,
                        EXPENSES_FILL,
                    ),
                ],
            },
        }
    }

    /// Expense totals per category as bars.
    pub fn categories(report: &Report) -> Self {
        let totals = &report.category_totals;
        Self {
            kind: ChartKind::Bar,
            data: ChartData {
                labels: totals.iter().map(|t| t.category.clone()).collect(),
                datasets: vec![Dataset {
                    label: "Total expenses".to_string(),
                    data: totals.iter().map(|t| t.total.to_f64()).collect(),
                    border_color: None,
                    background_color: CATEGORY_COLOR.to_string(),
                    fill: None,
                }],
            },
        }
    }

    pub fn for_slot(slot: Slot, report: &Report) -> Self {
        match slot {
            Slot::Comparison => Self::comparison(report),
            Slot::Categories => Self::categories(report),
        }
    }
}

/// Identifies a chart created by a `ChartRenderer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle {
    id: u64,
    slot: Slot,
}

impl ChartHandle {
    pub fn new(id: u64, slot: Slot) -> Self {
        Self { id, slot }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }
}

/// Something that can draw charts and a summary block.
pub trait ChartRenderer: Send {
    /// Draws `spec` in `slot`. The slot must be empty.
    fn create(&mut self, slot: Slot, spec: &ChartSpec) -> Res<ChartHandle>;

    /// Removes the chart identified by `handle`.
    fn dispose(&mut self, handle: ChartHandle) -> Res<()>;

    /// Replaces the summary block.
    fn write_summary(&mut self, lines: &[String]) -> Res<()>;
}

#[derive(Debug, Clone)]
struct Drawn {
    id: u64,
    spec: ChartSpec,
}

/// Renders into a standalone HTML page.
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer {
    title: String,
    next_id: u64,
    comparison: Option<Drawn>,
    categories: Option<Drawn>,
    summary: Vec<String>,
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Drawn> {
        match slot {
            Slot::Comparison => &mut self.comparison,
            Slot::Categories => &mut self.categories,
        }
    }

    fn slot(&self, slot: Slot) -> Option<&Drawn> {
        match slot {
            Slot::Comparison => self.comparison.as_ref(),
            Slot::Categories => self.categories.as_ref(),
        }
    }

    /// The number of charts currently drawn.
    pub fn live_charts(&self) -> usize {
        Slot::ALL.iter().filter(|s| self.slot(**s).is_some()).count()
    }

    /// Builds the page from the charts currently drawn.
    pub fn page(&self) -> Res<String> {
        let mut summary = String::new();
        for line in &self.summary {
            writeln!(summary, "      <li>{}</li>", escape_html(line))?;
        }

        let mut sections = String::new();
        let mut scripts = String::new();
        for slot in Slot::ALL {
            let Some(drawn) = self.slot(slot) else {
                continue;
            };
            let id = slot.element_id();
            writeln!(
                sections,
                "    <section>\n      <h2>{}</h2>\n      <canvas id=\"{id}\"></canvas>\n    </section>",
                slot.title()
            )?;
            let config = serde_json::to_string(&drawn.spec)
                .with_context(|| format!("Unable to serialize the {slot} chart"))?;
            writeln!(
                scripts,
                "new Chart(document.getElementById('{id}'), {});",
                escape_script(&config)
            )?;
        }

        Ok(format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="{CHART_JS}"></script>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; color: #222; }}
    section {{ max-width: 48rem; margin-bottom: 2rem; }}
    ul.summary {{ list-style: none; padding: 0; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <section>
    <ul class="summary">
{summary}    </ul>
  </section>
{sections}  <script>
{scripts}  </script>
</body>
</html>
"##,
            title = escape_html(&self.title),
        ))
    }
}

impl ChartRenderer for HtmlRenderer {
    fn create(&mut self, slot: Slot, spec: &ChartSpec) -> Res<ChartHandle> {
        if self.slot(slot).is_some() {
            bail!("The {slot} chart has not been disposed");
        }
        self.next_id += 1;
        let id = self.next_id;
        *self.slot_mut(slot) = Some(Drawn {
            id,
            spec: spec.clone(),
        });
        Ok(ChartHandle::new(id, slot))
    }

    fn dispose(&mut self, handle: ChartHandle) -> Res<()> {
        let drawn = self.slot_mut(handle.slot());
        if drawn.as_ref().map(|d| d.id) != Some(handle.id()) {
            bail!("No {} chart with id {}", handle.slot(), handle.id());
        }
        *drawn = None;
        Ok(())
    }

    fn write_summary(&mut self, lines: &[String]) -> Res<()> {
        self.summary = lines.to_vec();
        Ok(())
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keeps JSON embedded in a `<script>` element from closing it.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Filtered;
    use crate::test::{record, ymd};
    use serde_json::json;

    fn report() -> Report {
        let sunday = ymd(2024, 1, 7);
        Report::build(&Filtered {
            sales: vec![record("100", sunday, Some("A"))],
            expenses: vec![
                record("40", sunday, Some("B")),
                record("2.5", ymd(2024, 1, 8), None),
            ],
            skipped: 0,
        })
    }

    #[test]
    fn test_comparison_spec_json() {
        let spec = ChartSpec::comparison(&report());
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(
            value["data"]["labels"],
            json!(["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"])
        );
        let sales = &value["data"]["datasets"][0];
        assert_eq!(sales["label"], "Sales");
        assert_eq!(sales["borderColor"], SALES_COLOR);
        assert_eq!(sales["backgroundColor"], SALES_FILL);
        assert_eq!(sales["data"], json!([100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        let expenses = &value["data"]["datasets"][1];
        assert_eq!(expenses["label"], "Expenses");
        assert_eq!(expenses["data"][1], json!(2.5));
    }

    #[test]
    fn test_categories_spec_json() {
        let spec = ChartSpec::categories(&report());
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "bar");
        assert_eq!(value["data"]["labels"], json!(["B", "Other"]));
        let totals = &value["data"]["datasets"][0];
        assert_eq!(totals["label"], "Total expenses");
        assert_eq!(totals["backgroundColor"], CATEGORY_COLOR);
        assert_eq!(totals["data"], json!([40.0, 2.5]));
        assert!(totals.get("borderColor").is_none());
    }

    #[test]
    fn test_create_requires_an_empty_slot() {
        let mut renderer = HtmlRenderer::new("t");
        let spec = ChartSpec::comparison(&report());
        let handle = renderer.create(Slot::Comparison, &spec).unwrap();
        assert!(renderer.create(Slot::Comparison, &spec).is_err());
        renderer.dispose(handle).unwrap();
        assert_eq!(renderer.live_charts(), 0);
        let again = renderer.create(Slot::Comparison, &spec).unwrap();
        assert_ne!(again.id(), handle.id());
        assert_eq!(renderer.live_charts(), 1);
    }

    #[test]
    fn test_dispose_stale_handle_fails() {
        let mut renderer = HtmlRenderer::new("t");
        let spec = ChartSpec::categories(&report());
        let first = renderer.create(Slot::Categories, &spec).unwrap();
        renderer.dispose(first).unwrap();
        assert!(renderer.dispose(first).is_err());
    }

    #[test]
    fn test_page_contents() {
        let mut renderer = HtmlRenderer::new("Sales & expenses");
        let r = report();
        for slot in Slot::ALL {
            renderer.create(slot, &ChartSpec::for_slot(slot, &r)).unwrap();
        }
        renderer
            .write_summary(&["Net profit: <b>$57.50</b>".to_string()])
            .unwrap();
        let page = renderer.page().unwrap();
        assert!(page.contains("<title>Sales &amp; expenses</title>"));
        assert!(page.contains("comparison-chart"));
        assert!(page.contains("categories-chart"));
        assert!(page.contains("&lt;b&gt;$57.50&lt;/b&gt;"));
        assert!(page.contains(r#""type":"bar""#));
        assert!(page.contains(CHART_JS));
    }

    #[test]
    fn test_script_escape() {
        assert_eq!(
            escape_script(r#"{"label":"</script>"}"#),
            r#"{"label":"<\/script>"}"#
        );
    }
}
