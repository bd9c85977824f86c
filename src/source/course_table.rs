use crate::coerce::{json_to_f64, json_to_i64};
use crate::error::SourceError;
use crate::model::{CategorySchema, CourseRow, MetricTable};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

pub const COURSE_TABLE_URL: &str = "https://datagolf.com/course-table";

/// The parsed page: rows plus the category to column mapping the page ships with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseTable {
    pub table: MetricTable,
    pub schema: CategorySchema,
}

pub trait CourseTableSource {
    /// # Errors
    ///
    /// Network failure, or a page without a usable data blob.
    fn fetch_course_table(&self) -> Result<CourseTable, SourceError>;
}

pub struct HttpCourseTable {
    http: reqwest::blocking::Client,
    url: String,
}

impl HttpCourseTable {
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            url: url.to_string(),
        }
    }
}

impl CourseTableSource for HttpCourseTable {
    fn fetch_course_table(&self) -> Result<CourseTable, SourceError> {
        let html = self.http.get(&self.url).send()?.error_for_status()?.text()?;
        parse_course_table(&extract_reload_data(&html)?)
    }
}

fn reload_data_pattern() -> Result<&'static Regex, SourceError> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)var reload_data = JSON\.parse\('(.+?)'\);").ok())
        .as_ref()
        .ok_or_else(|| SourceError::Parse("reload_data pattern".into()))
}

/// Finds the `reload_data` blob in the page's scripts and parses it.
///
/// # Errors
///
/// `SourceError::NotFound` when no script defines it; `Parse`/`Json` when it is malformed.
pub fn extract_reload_data(html: &str) -> Result<Value, SourceError> {
    let document = Html::parse_document(html);
    let scripts = Selector::parse("script").map_err(|e| SourceError::Parse(e.to_string()))?;
    let pattern = reload_data_pattern()?;
    for script in document.select(&scripts) {
        let text: String = script.text().collect();
        if !text.contains("var reload_data") {
            continue;
        }
        if let Some(captures) = pattern.captures(&text) {
            let literal = unescape_js_string(&captures[1])?;
            return Ok(serde_json::from_str(&literal)?);
        }
    }
    Err(SourceError::NotFound("reload_data".into()))
}

/// Decodes the escapes of a single-quoted JavaScript string literal.
///
/// # Errors
///
/// `SourceError::Parse` for a truncated or invalid escape.
pub fn unescape_js_string(raw: &str) -> Result<String, SourceError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| SourceError::Parse("trailing backslash".into()))?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '0' => out.push('\0'),
            'x' => out.push(hex_char(&mut chars, 2)?),
            'u' => {
                let high = hex_code(&mut chars, 4)?;
                if (0xD800..0xDC00).contains(&high) {
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        let low = hex_code(&mut lookahead, 4)?;
                        if (0xDC00..0xE000).contains(&low) {
                            chars = lookahead;
                            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                            out.push(to_char(code)?);
                            continue;
                        }
                    }
                    out.push(char::REPLACEMENT_CHARACTER);
                } else {
                    out.push(to_char(high)?);
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn hex_code(chars: &mut std::str::Chars<'_>, len: usize) -> Result<u32, SourceError> {
    let digits: String = chars.take(len).collect();
    if digits.len() != len {
        return Err(SourceError::Parse(format!("short escape \\{digits}")));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| SourceError::Parse(format!("bad escape {digits}")))
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> Result<char, SourceError> {
    to_char(hex_code(chars, len)?)
}

fn to_char(code: u32) -> Result<char, SourceError> {
    char::from_u32(code).ok_or_else(|| SourceError::Parse(format!("bad code point {code:#x}")))
}

fn course_name(row: &Value) -> Option<&str> {
    row.get("course_name")
        .or_else(|| row.get("event_name"))
        .and_then(Value::as_str)
}

/// Builds the metric table and schema from a parsed `reload_data` object.
///
/// Rows are named by `course_name`, or `event_name` on pages that use that key. Only the
/// columns the schema lists are read; a metric's rank lives in `<metric>_rank`.
///
/// # Errors
///
/// `SourceError::Parse` for a row without a name or a metric that is not a number.
pub fn parse_course_table(reload_data: &Value) -> Result<CourseTable, SourceError> {
    let mut schema = CategorySchema::new();
    if let Some(cats) = reload_data.get("table_cats").and_then(Value::as_object) {
        for (category, spec) in cats {
            let Some(cols) = spec.get("cols").and_then(Value::as_array) else {
                continue;
            };
            let metrics = cols
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            schema.insert(category, metrics);
        }
    }

    let metrics: Vec<String> = schema.all_columns().map(str::to_string).collect();
    let mut rows = Vec::new();
    for (index, raw) in reload_data
        .get("data")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
    {
        let name = course_name(raw)
            .ok_or_else(|| SourceError::Parse(format!("row {index} has no course name")))?;
        let mut row = CourseRow::new(name);
        for metric in &metrics {
            let value = match raw.get(metric) {
                Some(v) => json_to_f64(metric, v).map_err(|e| SourceError::Parse(e.to_string()))?,
                None => None,
            };
            let rank_key = format!("{metric}_rank");
            let rank = match raw.get(&rank_key) {
                Some(v) => json_to_i64(&rank_key, v)
                    .map_err(|e| SourceError::Parse(e.to_string()))?
                    .and_then(|r| u32::try_from(r).ok()),
                None => None,
            };
            row = row.with_metric(metric, value, rank);
        }
        rows.push(row);
    }
    Ok(CourseTable {
        table: MetricTable::new(rows),
        schema,
    })
}
