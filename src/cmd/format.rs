/*!
format.rs

Human output primitives for the `linkedin` CLI.

  - StyleOptions::new(no_color_flag, stdout_tty) -> StyleOptions
  - color(role, text, &StyleOptions) -> String
  - table(headers, rows, TableOpts, &StyleOptions) -> String
  - key_value(&Map, &StyleOptions) -> String
  - scalar(&Value) -> String
  - truncate_ellipsis(s, max_chars) -> String

Color is used only when stdout is a terminal, `--no-color` is absent and
`NO_COLOR` is unset. Width is taken from COLUMNS (clamped 40..=220), else 100.

NOTE:
  - Functions here return strings; nothing prints directly.
  - JSON output paths never go through these helpers.
*/

use serde_json::{Map, Value};
use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn new(no_color_flag: bool, stdout_tty: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some();

        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: stdout_tty && !no_color_flag && !no_color_env,
            term_width: width,
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            term_width: 100,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45", // cyan-ish
        Role::Accent => "38;5;213", // magenta/pink
        Role::Success => "38;5;82", // green
        Role::Error => "38;5;196",  // red
        Role::Dim => "2",           // faint
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                             */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    pub max_width: usize,
    pub truncate: bool,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0, // 0 -> auto style.term_width
            truncate: true,
            header_sep: true,
            min_col_width: 4,
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();
    let width_limit = if opts.max_width == 0 {
        style.term_width
    } else {
        opts.max_width.min(style.term_width)
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // Greedy shrink, widest columns first
    let total_raw: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if opts.truncate && total_raw > width_limit {
        let mut overflow = total_raw - width_limit;
        let mut ordered: Vec<(usize, usize)> = widths.iter().copied().enumerate().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, _) in ordered {
            if overflow == 0 {
                break;
            }
            let target = widths[idx];
            if target > opts.min_col_width {
                let shrink = (target - opts.min_col_width).min(overflow);
                widths[idx] -= shrink;
                overflow -= shrink;
            }
        }
    }

    let mut out = String::new();

    for (i, h) in headers.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let cell = pad_or_truncate(h, widths[i], opts.truncate);
        out.push_str(&color(Role::Accent, cell, style));
    }
    out.push('\n');

    if opts.header_sep {
        let sep = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&color(Role::Dim, sep, style));
        out.push('\n');
    }

    for row in rows {
        let line = (0..col_count)
            .map(|c| {
                let raw = row.get(c).map(|s| s.as_str()).unwrap_or("");
                pad_or_truncate(raw, widths[c], opts.truncate)
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn pad_or_truncate(s: &str, width: usize, truncate: bool) -> String {
    let len = display_width(s);
    if len == width {
        return s.to_string();
    }
    if len < width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if !truncate {
        return s.to_string();
    }
    truncate_ellipsis(&strip_ansi(s), width)
}

/* -------------------------------------------------------------------------- */
/* Key / Value Rendering                                                       */
/* -------------------------------------------------------------------------- */

/// Render an object as indented `key: value` lines. Nulls are skipped, nested
/// objects are indented by two, arrays of objects are separated by `---`.
pub fn key_value(obj: &Map<String, Value>, style: &StyleOptions) -> String {
    let mut out = String::new();
    write_key_value(&mut out, obj, 0, style);
    out
}

fn write_key_value(out: &mut String, obj: &Map<String, Value>, indent: usize, style: &StyleOptions) {
    let prefix = " ".repeat(indent);
    for (key, value) in obj {
        let label = color(Role::Primary, key, style);
        match value {
            Value::Null => continue,
            Value::Array(items) => {
                out.push_str(&format!("{prefix}{label}:\n"));
                if items.is_empty() {
                    out.push_str(&format!("{prefix}  (empty)\n"));
                } else if items[0].is_object() {
                    for item in items {
                        out.push_str(&format!("{prefix}  {}\n", color(Role::Dim, "---", style)));
                        match item {
                            Value::Object(inner) => write_key_value(out, inner, indent + 4, style),
                            other => out.push_str(&format!("{prefix}    {}\n", scalar(other))),
                        }
                    }
                } else {
                    for item in items {
                        out.push_str(&format!("{prefix}  - {}\n", scalar(item)));
                    }
                }
            }
            Value::Object(inner) => {
                out.push_str(&format!("{prefix}{label}:\n"));
                write_key_value(out, inner, indent + 2, style);
            }
            other => out.push_str(&format!("{prefix}{label}: {}\n", scalar(other))),
        }
    }
}

/// Plain-text form of a JSON value: strings unquoted, null empty, containers
/// as compact JSON.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                                */
/* -------------------------------------------------------------------------- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let raw_len = s.chars().count();
    if raw_len <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".into();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                      */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // Scans for ESC '[' ... letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                       */
/* -------------------------------------------------------------------------- */
