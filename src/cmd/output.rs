/*!
Output envelope for command results.

  errors present, no data -> {"success":false,"error":{type,message}}  (first error)
  otherwise               -> {"success":true,"data":<data|null>}

JSON is written when `--json` is given or stdout is not a terminal. Humans
get a table for arrays, key/value blocks for objects, and `Error: ...` lines
for action errors (suppressed by `--quiet`).
*/

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};

use super::format::{Role, StyleOptions, TableOpts, color, key_value, scalar, table};
use crate::workflow::{ActionError, ResultEnvelope};

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub json: bool,
    pub fields: Option<String>,
    pub quiet: bool,
    pub stdout_tty: bool,
    pub style: StyleOptions,
}

impl OutputOptions {
    fn json_mode(&self) -> bool {
        self.json || !self.stdout_tty
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Envelope<'a> {
    Success { success: bool, data: Value },
    Failure { success: bool, error: &'a ActionError },
}

/* ---- Field Selection ---- */

/// Keep only the listed top-level keys. Applied to an object, or to each item
/// of an array. Missing keys are skipped; non-object values become `{}`.
pub fn select_fields(data: Value, fields: &str) -> Value {
    let wanted: Vec<&str> = fields.split(',').map(str::trim).collect();
    match data {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| pick(item, &wanted)).collect())
        }
        other => pick(other, &wanted),
    }
}

fn pick(value: Value, wanted: &[&str]) -> Value {
    let Value::Object(mut record) = value else {
        return Value::Object(Map::new());
    };
    let mut out = Map::new();
    for field in wanted {
        if let Some(v) = record.remove(*field) {
            out.insert((*field).to_string(), v);
        }
    }
    Value::Object(out)
}

/* ---- Envelope Writers ---- */

pub fn format_output(
    result: ResultEnvelope<Value>,
    opts: &OutputOptions,
    out: &mut impl Write,
) -> io::Result<()> {
    if result.is_failure()
        && let Some(first) = result.errors.first()
    {
        return write_failure(first, opts, out);
    }

    let mut data = result.data;
    if let Some(fields) = opts.fields.as_deref() {
        data = data.map(|d| select_fields(d, fields));
    }

    if opts.json_mode() {
        return write_json(
            &Envelope::Success {
                success: true,
                data: data.unwrap_or(Value::Null),
            },
            out,
        );
    }
    match data {
        Some(d) => write_human(&d, &opts.style, out),
        None => Ok(()),
    }
}

pub fn format_void_output(
    errors: &[ActionError],
    success_message: &str,
    opts: &OutputOptions,
    out: &mut impl Write,
) -> io::Result<()> {
    if let Some(first) = errors.first() {
        return write_failure(first, opts, out);
    }
    if opts.json_mode() {
        return write_json(
            &Envelope::Success {
                success: true,
                data: Value::Null,
            },
            out,
        );
    }
    if !opts.quiet {
        writeln!(out, "{}", color(Role::Success, success_message, &opts.style))?;
    }
    Ok(())
}

fn write_failure(error: &ActionError, opts: &OutputOptions, out: &mut impl Write) -> io::Result<()> {
    if opts.json_mode() {
        return write_json(
            &Envelope::Failure {
                success: false,
                error,
            },
            out,
        );
    }
    if !opts.quiet {
        let line = format!("Error: {} ({})", error.message, error.kind);
        writeln!(out, "{}", color(Role::Error, line, &opts.style))?;
    }
    Ok(())
}

fn write_json(envelope: &Envelope<'_>, out: &mut impl Write) -> io::Result<()> {
    let text = serde_json::to_string_pretty(envelope).map_err(io::Error::other)?;
    writeln!(out, "{text}")
}

/* ---- Human Rendering ---- */

fn write_human(data: &Value, style: &StyleOptions, out: &mut impl Write) -> io::Result<()> {
    match data {
        Value::Null => Ok(()),
        Value::Array(rows) => write_rows(rows, style, out),
        Value::Object(obj) => out.write_all(key_value(obj, style).as_bytes()),
        other => writeln!(out, "{}", scalar(other)),
    }
}

fn write_rows(rows: &[Value], style: &StyleOptions, out: &mut impl Write) -> io::Result<()> {
    let Some(first) = rows.first() else {
        return writeln!(out, "(no results)");
    };
    let Value::Object(first) = first else {
        for row in rows {
            writeln!(out, "{}", scalar(row))?;
        }
        return Ok(());
    };

    // Columns come from the first row
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(*h).map(scalar).unwrap_or_default())
                .collect()
        })
        .collect();
    out.write_all(table(&headers, &cells, TableOpts::default(), style).as_bytes())
}
