//! Minimal PDF rendering for selection summaries and floor-plan markups.
//!
//! Documents use a single built-in font (Helvetica) and a handful of drawing
//! operators, which is all the summaries need. The floor-plan page is a
//! placeholder frame with the placed points drawn on it; the uploaded plan
//! itself is not embedded.

use std::fmt::Write as _;

use crate::materials::MaterialRow;
use crate::pricing::{line_total, round_currency, PriceSummary};
use crate::types::{Money, Timestamp};
use crate::wizard::SelectedUpgrade;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;

const MARGIN: f64 = 50.0;
const LINE_HEIGHT: f64 = 16.0;
const MAX_LINE_CHARS: usize = 95;

// ---------------------------------------------------------------------------
// Low-level document model
// ---------------------------------------------------------------------------

/// One page's content stream.
#[derive(Debug, Default, Clone)]
pub struct Page {
    ops: String,
}

impl Page {
    pub fn text(&mut self, x: f64, y: f64, size: f64, text: &str) {
        let _ = writeln!(
            self.ops,
            "BT /F1 {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape_text(text)
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let _ = writeln!(self.ops, "{x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S");
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let _ = writeln!(self.ops, "{x:.2} {y:.2} {w:.2} {h:.2} re S");
    }

    /// A filled square marker centred on `(x, y)`.
    pub fn marker(&mut self, x: f64, y: f64, half: f64) {
        let _ = writeln!(
            self.ops,
            "{:.2} {:.2} {:.2} {:.2} re f",
            x - half,
            y - half,
            half * 2.0,
            half * 2.0
        );
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfDocument {
    pages: Vec<Page>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Serialize to PDF 1.4 bytes with a valid cross-reference table.
    pub fn render(&self) -> Vec<u8> {
        let pages: Vec<Page> = if self.pages.is_empty() {
            vec![Page::default()]
        } else {
            self.pages.clone()
        };

        // Object layout: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
        let page_obj = |i: usize| 4 + i * 2;
        let kids = (0..pages.len())
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, page) in pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_obj(i) + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                page.ops.len(),
                page.ops
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1);
        }

        let xref_at = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in &offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        );
        out.into_bytes()
    }
}

/// Escape PDF string delimiters and replace anything outside printable ASCII.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Top-down text flow that starts a new page when the current one is full.
struct Flow {
    doc: PdfDocument,
    page: Page,
    y: f64,
}

impl Flow {
    fn new() -> Self {
        Self {
            doc: PdfDocument::new(),
            page: Page::default(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, needed: f64) {
        if self.y - needed < MARGIN {
            let full = std::mem::take(&mut self.page);
            self.doc.push_page(full);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line_at(&mut self, x: f64, size: f64, text: &str) {
        self.ensure_room(LINE_HEIGHT);
        self.page.text(x, self.y, size, &truncate(text, MAX_LINE_CHARS));
        self.y -= LINE_HEIGHT;
    }

    fn line(&mut self, size: f64, text: &str) {
        self.line_at(MARGIN, size, text);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }

    fn rule(&mut self) {
        self.ensure_room(LINE_HEIGHT);
        self.page.line(MARGIN, self.y + 10.0, PAGE_WIDTH - MARGIN, self.y + 10.0);
        self.y -= LINE_HEIGHT / 2.0;
    }

    fn finish(mut self) -> PdfDocument {
        self.doc.push_page(self.page);
        self.doc
    }
}

fn money(amount: Money) -> String {
    format!("${}", round_currency(amount))
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Everything printed on a selection summary.
#[derive(Debug, Clone)]
pub struct SelectionSummary<'a> {
    pub project_name: &'a str,
    pub unit_number: &'a str,
    pub client_name: Option<&'a str>,
    pub status: &'a str,
    pub submitted_at: Option<Timestamp>,
    pub color_scheme_name: Option<&'a str>,
    pub materials: &'a [MaterialRow],
    pub upgrades: &'a [SelectedUpgrade],
    pub prices: PriceSummary,
}

pub fn render_selection_summary(summary: &SelectionSummary<'_>) -> Vec<u8> {
    let mut flow = Flow::new();

    flow.line(18.0, &format!("{} - Unit {}", summary.project_name, summary.unit_number));
    flow.gap();
    if let Some(client) = summary.client_name {
        flow.line(11.0, &format!("Purchaser: {client}"));
    }
    flow.line(11.0, &format!("Status: {}", summary.status));
    if let Some(at) = summary.submitted_at {
        flow.line(11.0, &format!("Submitted: {}", at.format("%Y-%m-%d %H:%M UTC")));
    }
    flow.gap();

    flow.line(14.0, "Colour Scheme");
    flow.rule();
    flow.line(11.0, summary.color_scheme_name.unwrap_or("Not selected"));
    for row in summary.materials {
        let supplier = row
            .supplier_url
            .as_deref()
            .map(|u| format!("  ({u})"))
            .unwrap_or_default();
        flow.line_at(MARGIN + 15.0, 10.0, &format!("{}: {}{supplier}", row.label, row.value));
    }
    flow.gap();

    flow.line(14.0, "Upgrades");
    flow.rule();
    if summary.upgrades.is_empty() {
        flow.line(11.0, "No upgrades selected");
    }
    for upgrade in summary.upgrades {
        flow.line(
            10.0,
            &format!(
                "{} [{}]  {} x {} = {}",
                upgrade.name,
                upgrade.category,
                upgrade.quantity,
                money(upgrade.price),
                money(line_total(upgrade.price, upgrade.quantity))
            ),
        );
    }
    flow.gap();
    flow.rule();
    flow.line(11.0, &format!("Upgrade subtotal: {}", money(summary.prices.subtotal)));
    flow.line(11.0, &format!("GST (15%): {}", money(summary.prices.gst)));
    flow.line(12.0, &format!("Total incl. GST: {}", money(summary.prices.total)));

    flow.finish().render()
}

/// Frame the plan occupies on the page: (x, y, width, height).
const PLAN_FRAME: (f64, f64, f64, f64) = (MARGIN, 200.0, PAGE_WIDTH - 2.0 * MARGIN, 560.0);

/// Map normalized plan coordinates (origin top-left) to page points.
pub fn plan_to_page(x: f64, y: f64) -> (f64, f64) {
    let (fx, fy, fw, fh) = PLAN_FRAME;
    (fx + x * fw, fy + (1.0 - y) * fh)
}

/// Placeholder floor plan with one numbered marker per placed point.
pub fn render_floor_plan(project_name: &str, unit_number: &str, upgrades: &[SelectedUpgrade]) -> Vec<u8> {
    let mut page = Page::default();
    page.text(MARGIN, PAGE_HEIGHT - MARGIN, 16.0, &format!("{project_name} - Unit {unit_number}"));
    page.text(MARGIN, PAGE_HEIGHT - MARGIN - 20.0, 11.0, "Electrical and lighting placements");

    let (fx, fy, fw, fh) = PLAN_FRAME;
    page.rect(fx, fy, fw, fh);

    let mut legend_y = fy - 25.0;
    let mut n = 0;
    for upgrade in upgrades.iter().filter(|u| u.needs_placement()) {
        for point in &upgrade.points {
            n += 1;
            let (px, py) = plan_to_page(point.x, point.y);
            page.marker(px, py, 3.0);
            page.text(px + 5.0, py + 3.0, 8.0, &n.to_string());

            if legend_y > MARGIN {
                let label = point.label.as_deref().unwrap_or(&upgrade.name);
                page.text(MARGIN, legend_y, 9.0, &truncate(&format!("{n}. {label}"), MAX_LINE_CHARS));
                legend_y -= 12.0;
            }
        }
    }
    if n == 0 {
        page.text(fx + 10.0, fy + fh / 2.0, 11.0, "No placements");
    }

    let mut doc = PdfDocument::new();
    doc.push_page(page);
    doc.render()
}
