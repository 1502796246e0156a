use std::fmt::Write as _;

use arena_core::core_api::{RecordSummary, Session};
use arena_core::record::EditableField;
use arena_core::roster::RosterQuery;
use serde_json::{Map as JsonMap, Value as JsonValue};

const INDEX_COL_WIDTH: usize = 5;
const ID_COL_WIDTH: usize = 6;
const UNIT_ID_COL_WIDTH: usize = 7;
const TEAM_COL_WIDTH: usize = 5;
const NAME_COL_WIDTH: usize = 24;
const LEVEL_COL_WIDTH: usize = 6;
const POINT_COL_WIDTH: usize = 10;
const STAT_COL_WIDTH: usize = 5;
const MATCH_MARKER: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Adds the six base-stat columns.
    pub base_stats: bool,
}

/// Top-level attributes to print instead of the roster.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetaSelection {
    pub gold: bool,
    pub reputation: bool,
}

impl MetaSelection {
    pub fn is_any_selected(&self) -> bool {
        self.gold || self.reputation
    }
}

pub fn render_json_full(session: &Session, query: &RosterQuery, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session, query)),
    }
}

pub fn render_json_meta(session: &Session, fields: &MetaSelection, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(meta_json(session, fields)),
    }
}

pub fn render_json_roster(rows: &[RecordSummary], style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Array(rows.iter().map(summary_to_json).collect()),
    }
}

/// `key=value` lines for the selected attributes, in a fixed order.
pub fn render_meta_text(session: &Session, fields: &MetaSelection) -> String {
    let mut out = String::new();
    for (key, value) in meta_pairs(session, fields) {
        writeln!(&mut out, "{key}={}", format_optional(value))
            .expect("writing to String cannot fail");
    }
    out
}

pub fn render_text(session: &Session, query: &RosterQuery, style: TextStyle) -> String {
    render_text_with_options(session, query, style, TextRenderOptions::default())
}

pub fn render_text_with_options(
    session: &Session,
    query: &RosterQuery,
    style: TextStyle,
    options: TextRenderOptions,
) -> String {
    match style {
        TextStyle::Table => {
            let rows = session.summaries(query);
            let mut out = String::new();
            if let Some(path) = session.path() {
                writeln!(&mut out, "Save: {}", path.display())
                    .expect("writing to String cannot fail");
            }
            writeln!(
                &mut out,
                "Wealth: {}  Reputation: {}",
                format_optional(session.gold()),
                format_optional(session.reputation())
            )
            .expect("writing to String cannot fail");
            if session.pruned_dead() > 0 {
                writeln!(
                    &mut out,
                    "Dead records dropped: {}",
                    session.pruned_dead()
                )
                .expect("writing to String cannot fail");
            }
            writeln!(&mut out).expect("writing to String cannot fail");
            out.push_str(&render_roster_table(&rows, query, options));
            out
        }
    }
}

/// Fixed-width roster table. Rows whose name matched the search are marked
/// with `*`.
pub fn render_roster_table(
    rows: &[RecordSummary],
    query: &RosterQuery,
    options: TextRenderOptions,
) -> String {
    let mut out = String::new();

    let mut header = String::from(" ");
    for (label, width) in [
        ("idx", INDEX_COL_WIDTH),
        ("id", ID_COL_WIDTH),
        ("unitId", UNIT_ID_COL_WIDTH),
        ("team", TEAM_COL_WIDTH),
        ("unitname", NAME_COL_WIDTH),
        ("level", LEVEL_COL_WIDTH),
        ("potential", POINT_COL_WIDTH),
        ("skill", POINT_COL_WIDTH),
        ("living", POINT_COL_WIDTH),
    ] {
        header.push_str(&cell(label, width));
    }
    if options.base_stats {
        for field in EditableField::BASE_STATS {
            header.push_str(&cell(stat_label(field), STAT_COL_WIDTH));
        }
    }
    writeln!(&mut out, "{}", header.trim_end()).expect("writing to String cannot fail");

    for row in rows {
        let mut line = String::new();
        line.push(if query.name_hit(&row.name) {
            MATCH_MARKER
        } else {
            ' '
        });
        line.push_str(&cell(&row.index.to_string(), INDEX_COL_WIDTH));
        line.push_str(&cell(&format_optional(row.id), ID_COL_WIDTH));
        line.push_str(&cell(&format_optional(row.unit_id), UNIT_ID_COL_WIDTH));
        line.push_str(&cell(&format_optional(row.team), TEAM_COL_WIDTH));
        line.push_str(&cell(&row.name, NAME_COL_WIDTH));
        line.push_str(&cell(&row.level.to_string(), LEVEL_COL_WIDTH));
        line.push_str(&cell(&row.potential_point.to_string(), POINT_COL_WIDTH));
        line.push_str(&cell(&row.skill_point.to_string(), POINT_COL_WIDTH));
        line.push_str(&cell(&row.living_skill_point.to_string(), POINT_COL_WIDTH));
        if options.base_stats {
            for field in EditableField::BASE_STATS {
                line.push_str(&cell(&row.field(field).to_string(), STAT_COL_WIDTH));
            }
        }
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }

    writeln!(&mut out, "{} record(s)", rows.len()).expect("writing to String cannot fail");
    out
}

fn default_json(session: &Session, query: &RosterQuery) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    out.insert(
        "path".to_string(),
        match session.path() {
            Some(path) => JsonValue::String(path.display().to_string()),
            None => JsonValue::Null,
        },
    );
    out.extend(meta_json(
        session,
        &MetaSelection {
            gold: true,
            reputation: true,
        },
    ));
    out.insert(
        "dead_pruned".to_string(),
        JsonValue::from(session.pruned_dead()),
    );
    out.insert(
        "roster".to_string(),
        render_json_roster(&session.summaries(query), JsonStyle::CanonicalV1),
    );

    out
}

fn meta_json(session: &Session, fields: &MetaSelection) -> JsonMap<String, JsonValue> {
    meta_pairs(session, fields)
        .into_iter()
        .map(|(key, value)| {
            (
                key.to_string(),
                value.map(JsonValue::from).unwrap_or(JsonValue::Null),
            )
        })
        .collect()
}

fn meta_pairs<'a>(session: &'a Session, fields: &MetaSelection) -> Vec<(&'a str, Option<i64>)> {
    let config = session.config();
    let mut out = Vec::new();
    if fields.gold {
        out.push((config.gold_key.as_str(), session.gold()));
    }
    if fields.reputation {
        out.push((config.reputation_key.as_str(), session.reputation()));
    }
    out
}

fn summary_to_json(row: &RecordSummary) -> JsonValue {
    serde_json::to_value(row).expect("record summaries always serialize")
}

fn format_optional(value: Option<i64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn stat_label(field: EditableField) -> &'static str {
    match field {
        EditableField::Strength => "STR",
        EditableField::Endurance => "END",
        EditableField::Agility => "AGI",
        EditableField::Precision => "PRE",
        EditableField::Intelligence => "INT",
        EditableField::Willpower => "WIL",
        _ => "",
    }
}

/// Left-aligned cell of `width` columns, leaving at least one space after the
/// value.
fn cell(value: &str, width: usize) -> String {
    format!("{:<w$}", fit_column(value, width - 1), w = width)
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}
