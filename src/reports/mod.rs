//! Customer-facing service reports built from a work order's repair notes.
//!
//! Technicians (or the AI assistant) usually write the notes as a JSON object;
//! free text is accepted too and becomes the report summary.

use crate::models::allocated_part::{self, PartStatus};
use crate::models::work_order::{self, WorkOrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportContent {
    pub summary: Option<String>,
    pub findings: Option<String>,
    pub actions_taken: Option<String>,
    pub recommendations: Option<String>,
    pub technician: Option<String>,
    pub customer_name: Option<String>,
    pub signed_off: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UsedPart {
    pub name: String,
    pub part_number: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceReport {
    pub work_order_id: Uuid,
    pub title: String,
    pub status: WorkOrderStatus,
    pub customer_name: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub content: ReportContent,
    pub used_parts: Vec<UsedPart>,
    pub generated_at: DateTime<Utc>,
}

/// Renders a JSON value as report text. Lists become one line per item.
fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(as_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Object(_) => String::new(),
    };
    (!text.is_empty()).then_some(text)
}

fn as_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "signed"
        ),
        _ => false,
    }
}

fn from_object(obj: &Map<String, Value>) -> ReportContent {
    let field = |key: &str| obj.get(key).and_then(as_text);
    ReportContent {
        summary: field("summary"),
        findings: field("findings"),
        actions_taken: field("actions_taken"),
        recommendations: field("recommendations"),
        technician: field("technician"),
        customer_name: field("customer_name"),
        signed_off: as_flag(obj.get("signed_off")),
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Parses repair notes: a JSON object, then a `{...}` object embedded in
/// surrounding text, then the whole text as the summary.
pub fn parse_notes(notes: &str) -> ReportContent {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return ReportContent::default();
    }

    if let Some(obj) = parse_object(trimmed) {
        return from_object(&obj);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(obj) = parse_object(&trimmed[start..=end]) {
                return from_object(&obj);
            }
        }
    }

    ReportContent {
        summary: Some(trimmed.to_string()),
        ..ReportContent::default()
    }
}

impl ServiceReport {
    /// Only parts marked `Used` appear on the report.
    pub fn build(
        work_order: &work_order::Model,
        parts: &[allocated_part::Model],
        customer_name: Option<String>,
    ) -> Self {
        let content = parse_notes(work_order.notes.as_deref().unwrap_or_default());
        let used_parts = parts
            .iter()
            .filter(|p| p.status == PartStatus::Used)
            .map(|p| UsedPart {
                name: p.name.clone(),
                part_number: p.part_number.clone(),
                quantity: p.quantity,
            })
            .collect();

        Self {
            work_order_id: work_order.id,
            title: work_order.title.clone(),
            status: work_order.status,
            customer_name: customer_name.or_else(|| content.customer_name.clone()),
            completed_at: work_order.completed_at,
            content,
            used_parts,
            generated_at: Utc::now(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SERVICE REPORT");
        let _ = writeln!(out, "Work order: {}", self.title);
        let _ = writeln!(out, "Reference: {}", self.work_order_id);
        if let Some(customer) = &self.customer_name {
            let _ = writeln!(out, "Customer: {}", customer);
        }
        if let Some(done) = self.completed_at {
            let _ = writeln!(out, "Completed: {}", done.format("%Y-%m-%d %H:%M UTC"));
        }

        let sections = [
            ("Summary", &self.content.summary),
            ("Findings", &self.content.findings),
            ("Actions taken", &self.content.actions_taken),
            ("Recommendations", &self.content.recommendations),
        ];
        for (heading, body) in sections {
            if let Some(body) = body {
                let _ = writeln!(out, "\n{}\n{}", heading, body);
            }
        }

        if !self.used_parts.is_empty() {
            let _ = writeln!(out, "\nParts used");
            for part in &self.used_parts {
                match &part.part_number {
                    Some(number) => {
                        let _ = writeln!(out, "- {} x {} ({})", part.quantity, part.name, number);
                    }
                    None => {
                        let _ = writeln!(out, "- {} x {}", part.quantity, part.name);
                    }
                }
            }
        }

        if let Some(technician) = &self.content.technician {
            let _ = writeln!(out, "\nTechnician: {}", technician);
        }
        let _ = writeln!(
            out,
            "Customer sign-off: {}",
            if self.content.signed_off { "yes" } else { "no" }
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_notes_are_parsed() {
        let content = parse_notes(
            r#"{"summary":"Boiler serviced","findings":["Scale on exchanger","Worn gasket"],"signed_off":true,"technician":"Jane"}"#,
        );
        assert_eq!(content.summary.as_deref(), Some("Boiler serviced"));
        assert_eq!(
            content.findings.as_deref(),
            Some("Scale on exchanger\nWorn gasket")
        );
        assert_eq!(content.technician.as_deref(), Some("Jane"));
        assert!(content.signed_off);
    }

    #[test]
    fn embedded_object_is_found() {
        let content = parse_notes(
            "Notes from site visit:\n{\"summary\": \"Pump replaced\", \"signed_off\": \"yes\"}\nThanks",
        );
        assert_eq!(content.summary.as_deref(), Some("Pump replaced"));
        assert!(content.signed_off);
    }

    #[test]
    fn free_text_becomes_summary() {
        let content = parse_notes("  Replaced the fan belt {not json}  ");
        assert_eq!(
            content.summary.as_deref(),
            Some("Replaced the fan belt {not json}")
        );
        assert!(!content.signed_off);
        assert_eq!(parse_notes("   "), ReportContent::default());
    }

    #[test]
    fn arrays_at_top_level_fall_back_to_summary() {
        let content = parse_notes("[1, 2]");
        assert_eq!(content.summary.as_deref(), Some("[1, 2]"));
    }
}
