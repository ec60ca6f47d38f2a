//! CSV and JSON batch rendering.
//!
//! Feed a file of sentences to a [`VoiceCloner`] and get one numbered WAV
//! per row: `audio_0000.wav`, `audio_0001.wav`, ... in the output directory.
//! Numbering follows the row's position in the input file, so skipped rows
//! (empty text, missing field) leave gaps rather than renumbering everything
//! after them.
//!
//! A row that fails to render never aborts the run: it is recorded in the
//! [`BatchReport`] and the batch moves on. Only input-level problems (file
//! missing, column missing, unparseable content) fail the whole call.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cloner::VoiceCloner;
use crate::engines::xtts::Language;
use crate::sample;

/// Errors that invalidate a whole batch run, as opposed to single rows.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Column '{column}' not found in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unsupported JSON shape: expected an array of objects, got {0}")]
    JsonShape(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for a batch run. The defaults match the common case: a `text`
/// column, the default voice, outputs under `output_audio/`.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// CSV column / JSON field holding the text.
    pub text_key: String,
    /// Speaker sample to clone for every row. `None` renders with the
    /// default voice, detecting each row's language from its script.
    pub speaker_wav: Option<PathBuf>,
    /// Directory the numbered WAV files land in. Created if missing.
    pub output_dir: PathBuf,
    /// Language used when cloning. Plain rows ignore this and detect.
    pub language: Language,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            text_key: "text".to_string(),
            speaker_wav: None,
            output_dir: PathBuf::from("output_audio"),
            language: Language::En,
        }
    }
}

/// One row that failed to render.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Zero-based position of the row in the input file.
    pub index: usize,
    /// First 30 characters of the row's text.
    pub text: String,
    /// What went wrong.
    pub error: String,
}

/// Outcome of a batch run: which files rendered, which rows failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
struct Row {
    index: usize,
    text: String,
}

impl VoiceCloner {
    /// Render every row of a CSV file to numbered WAVs under
    /// `options.output_dir`.
    ///
    /// The file must have a header row naming `options.text_key` as one of
    /// its columns. Rows whose text cell is empty are skipped; their indices
    /// stay reserved so the `audio_NNNN.wav` names line up with the input.
    pub fn process_csv_file(
        &mut self,
        csv_path: &Path,
        options: &BatchOptions,
    ) -> Result<BatchReport, BatchError> {
        let rows = read_csv_rows(csv_path, &options.text_key)?;
        log::info!("Loaded {} rows from {}", rows.len(), csv_path.display());
        self.run_batch(rows, options)
    }

    /// Render every entry of a JSON file to numbered WAVs under
    /// `options.output_dir`.
    ///
    /// Accepts an array of objects (or a single object, treated as a
    /// one-element array). Each object contributes its `options.text_key`
    /// field; string and number values are spoken, anything else skips the
    /// entry.
    pub fn process_json_file(
        &mut self,
        json_path: &Path,
        options: &BatchOptions,
    ) -> Result<BatchReport, BatchError> {
        let rows = read_json_rows(json_path, &options.text_key)?;
        log::info!("Loaded {} entries from {}", rows.len(), json_path.display());
        self.run_batch(rows, options)
    }

    fn run_batch(
        &mut self,
        rows: Vec<Row>,
        options: &BatchOptions,
    ) -> Result<BatchReport, BatchError> {
        fs::create_dir_all(&options.output_dir)?;

        // One up-front sample check; a bad sample downgrades the run to the
        // default voice instead of failing every row the same way.
        let speaker_wav = match &options.speaker_wav {
            Some(path) => match sample::inspect_sample(path) {
                Ok(_) => Some(path.as_path()),
                Err(err) => {
                    log::warn!(
                        "Speaker sample rejected ({err}); rows render with the default voice"
                    );
                    None
                }
            },
            None => None,
        };

        let mut report = BatchReport::default();
        for row in rows {
            let output_path = options
                .output_dir
                .join(format!("audio_{:04}.wav", row.index));
            log::info!("Row {}: {}", row.index, preview(&row.text));

            let outcome = match speaker_wav {
                Some(wav) => self.clone_voice_from_sample(
                    &row.text,
                    wav,
                    &output_path,
                    options.language,
                    1.0,
                ),
                None => self.simple_text_to_speech(&row.text, &output_path),
            };
            match outcome {
                Ok(()) => report.succeeded.push(output_path),
                Err(err) => {
                    log::warn!("Row {} failed: {err}", row.index);
                    report.failed.push(BatchFailure {
                        index: row.index,
                        text: preview(&row.text),
                        error: err.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Batch done: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// The bundled demo corpus: five Ukrainian and three English sentences.
const SAMPLE_TEXTS: [&str; 8] = [
    "Привіт! Це перший приклад тексту для клонування голосу.",
    "Штучний інтелект змінює наш світ кожного дня.",
    "Технології машинного навчання стають все більш доступними.",
    "Клонування голосу відкриває нові можливості для творчості.",
    "Цей текст буде перетворено на аудіо за допомогою AI.",
    "Hello! This is an example in English language.",
    "Machine learning is fascinating and powerful technology.",
    "Voice cloning opens new possibilities for content creation.",
];

/// Write `sample_texts.csv` and `sample_texts.json` under `dir`, for trying
/// out the batch operations. Returns the CSV and JSON paths.
pub fn create_sample_data(dir: &Path) -> Result<(PathBuf, PathBuf), BatchError> {
    fs::create_dir_all(dir)?;

    let csv_path = dir.join("sample_texts.csv");
    let mut csv = String::from("text\n");
    for text in SAMPLE_TEXTS {
        csv.push_str(&csv_escape(text));
        csv.push('\n');
    }
    fs::write(&csv_path, csv)?;

    #[derive(Serialize)]
    struct Entry<'a> {
        text: &'a str,
        id: usize,
    }
    let entries: Vec<Entry> = SAMPLE_TEXTS
        .iter()
        .enumerate()
        .map(|(id, text)| Entry { text, id })
        .collect();
    let json_path = dir.join("sample_texts.json");
    let body = serde_json::to_string_pretty(&entries).map_err(|source| BatchError::Json {
        path: json_path.clone(),
        source,
    })?;
    fs::write(&json_path, body)?;

    log::info!(
        "Sample data written: {} and {}",
        csv_path.display(),
        json_path.display()
    );
    Ok((csv_path, json_path))
}

/// First 30 characters, for logs and failure reports.
fn preview(text: &str) -> String {
    text.chars().take(30).collect()
}

fn read_csv_rows(path: &Path, column: &str) -> Result<Vec<Row>, BatchError> {
    if !path.is_file() {
        return Err(BatchError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let mut records = parse_csv(&content)?;
    if records.is_empty() {
        return Err(BatchError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        });
    }

    let header = records.remove(0);
    let column_index = header.iter().position(|name| name == column).ok_or_else(|| {
        BatchError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }
    })?;

    let rows = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let text = record
                .get(column_index)
                .map(|cell| cell.trim())
                .unwrap_or("");
            if text.is_empty() {
                log::debug!("Skipping row {index}: empty text");
                None
            } else {
                Some(Row {
                    index,
                    text: text.to_string(),
                })
            }
        })
        .collect();
    Ok(rows)
}

/// Minimal RFC 4180 reader: quoted fields, doubled-quote escapes, newlines
/// inside quotes, CRLF line endings. Blank lines are dropped without
/// consuming a row index.
fn parse_csv(content: &str) -> Result<Vec<Vec<String>>, BatchError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    // distinguishes a blank line from an explicitly empty quoted field
    let mut record_started = false;
    let mut in_quotes = false;
    let mut line = 1;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                record_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                record_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                if record_started || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                record_started = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(BatchError::Csv {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if record_started || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn read_json_rows(path: &Path, key: &str) -> Result<Vec<Row>, BatchError> {
    if !path.is_file() {
        return Err(BatchError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let parsed: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| BatchError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let entries = match parsed {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        other => return Err(BatchError::JsonShape(json_type_name(&other))),
    };

    let rows = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let map = match entry {
                serde_json::Value::Object(map) => map,
                _ => {
                    log::warn!("Skipping entry {index}: not an object");
                    return None;
                }
            };
            let text = match map.get(key) {
                Some(serde_json::Value::String(text)) => text.trim().to_string(),
                Some(serde_json::Value::Number(number)) => number.to_string(),
                _ => {
                    log::debug!("Skipping entry {index}: no usable '{key}' field");
                    return None;
                }
            };
            if text.is_empty() {
                log::debug!("Skipping entry {index}: empty text");
                None
            } else {
                Some(Row { index, text })
            }
        })
        .collect();
    Ok(rows)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
