//! Bulk student import from an uploaded CSV file.
//!
//! The importer validates the upload, walks the records in file order and
//! commits one account + profile per data row through a [`StudentStore`].
//! Row problems never abort the batch; they are tallied and reported as
//! [`Diagnostic`] messages alongside the success/failure counters.
//!
//! Which column feeds which field is declared by a [`ColumnMapping`]. The
//! default mapping reproduces the legacy spreadsheet layout:
//!
//! ```text
//! 0 email         4 last_name      8 (ignored)
//! 1 password      5 gender         9 date_of_birth, date_admitted
//! 2 first_name    6 (ignored)     10 address
//! 3 other_name    7 student_class
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::student::{normalize_email, parse_date, validate_email, NewStudent, ProfileFields};
use crate::types::DbId;

/// Required filename suffix (case-sensitive).
pub const CSV_EXTENSION: &str = ".csv";

pub const MSG_NO_FILE: &str = "No file uploaded";
pub const MSG_UNSUPPORTED_FORMAT: &str = "CSV file format not supported";

// ── Store seam ───────────────────────────────────────────────────────

/// Why the store refused to create a student.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("an account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("{0}")]
    Rejected(String),
}

/// Persistence for imported students.
///
/// `create_student` must be atomic: either both the account and its profile
/// exist afterwards, or neither does.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Create the account and its profile. Returns the new profile id.
    async fn create_student(&self, student: &NewStudent) -> Result<DbId, StoreError>;
}

// ── Options ──────────────────────────────────────────────────────────

/// How the first record of the file is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Always discard the first record.
    Skip,
    /// Discard the first record only when its email cell holds no address.
    #[default]
    Detect,
    /// Every record is data.
    None,
}

impl HeaderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Detect => "detect",
            Self::None => "none",
        }
    }
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "detect" => Ok(Self::Detect),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown header mode '{other}' (expected skip, detect or none)"
            )),
        }
    }
}

/// Source column index for every imported field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub email: usize,
    pub password: usize,
    pub first_name: usize,
    pub other_name: usize,
    pub last_name: usize,
    pub gender: usize,
    pub student_class: usize,
    pub date_of_birth: usize,
    pub date_admitted: usize,
    pub address: usize,
    /// Columns that are part of the layout but deliberately not read.
    pub ignored: Vec<usize>,
}

impl ColumnMapping {
    /// The eleven-column spreadsheet layout used by existing exports.
    ///
    /// Column 6 held a photo path and column 8 a second date; neither is
    /// applied. `date_admitted` is read from the birth-date column.
    pub fn legacy() -> Self {
        Self {
            email: 0,
            password: 1,
            first_name: 2,
            other_name: 3,
            last_name: 4,
            gender: 5,
            student_class: 7,
            date_of_birth: 9,
            date_admitted: 9,
            address: 10,
            ignored: vec![6, 8],
        }
    }

    /// Read `date_admitted` from `column` instead.
    pub fn with_date_admitted(mut self, column: usize) -> Self {
        self.date_admitted = column;
        self.ignored.retain(|&c| c != column);
        self
    }

    fn read_columns(&self) -> [usize; 10] {
        [
            self.email,
            self.password,
            self.first_name,
            self.other_name,
            self.last_name,
            self.gender,
            self.student_class,
            self.date_of_birth,
            self.date_admitted,
            self.address,
        ]
    }

    /// Minimum number of fields a data row must carry.
    pub fn min_fields(&self) -> usize {
        self.read_columns()
            .into_iter()
            .chain(self.ignored.iter().copied())
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::legacy()
    }
}

/// Per-run import options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub header: HeaderMode,
    pub columns: ColumnMapping,
}

/// An uploaded file: its client-supplied name and raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
}

// ── Outcome ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Success,
    Warning,
    Error,
}

/// A human-readable message surfaced to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// 1-based line of the record the message is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// Rows were processed (possibly with per-row failures).
    Completed,
    /// The upload was refused before any row was read.
    Rejected,
}

/// Aggregate result of one import run.
///
/// Counters are absent when the run was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub status: ImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_imports: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_imports: Option<u32>,
    pub messages: Vec<Diagnostic>,
}

impl ImportOutcome {
    /// An outcome for a run refused before any row was read.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Rejected,
            successful_imports: None,
            failed_imports: None,
            messages: vec![Diagnostic {
                level: DiagnosticLevel::Error,
                line: None,
                message: message.into(),
            }],
        }
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported { line: u64, profile_id: DbId },
    /// Zero-field record; not counted.
    Skipped { line: u64 },
    /// Too few fields; `raw` is the record as read.
    Incomplete { line: u64, raw: String },
    Failed { line: u64, reason: String },
}

/// Running counters and messages for an import in progress.
#[derive(Debug, Default)]
struct ImportTally {
    successful: u32,
    failed: u32,
    messages: Vec<Diagnostic>,
}

impl ImportTally {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported { .. } => self.successful += 1,
            RowOutcome::Skipped { .. } => {}
            RowOutcome::Incomplete { line, raw } => {
                self.failed += 1;
                self.messages.push(Diagnostic {
                    level: DiagnosticLevel::Warning,
                    line: Some(line),
                    message: format!("Skipping incomplete row: {raw}"),
                });
            }
            RowOutcome::Failed { line, reason } => {
                self.failed += 1;
                self.messages.push(Diagnostic {
                    level: DiagnosticLevel::Error,
                    line: Some(line),
                    message: format!("Error importing student: {reason}"),
                });
            }
        }
    }

    fn finish(mut self) -> ImportOutcome {
        self.messages.push(Diagnostic {
            level: DiagnosticLevel::Success,
            line: None,
            message: format!(
                "Import complete. Successful imports: {}, Failed imports: {}",
                self.successful, self.failed
            ),
        });
        ImportOutcome {
            status: ImportStatus::Completed,
            successful_imports: Some(self.successful),
            failed_imports: Some(self.failed),
            messages: self.messages,
        }
    }
}

// ── Import ───────────────────────────────────────────────────────────

/// Import every data row of `upload` through `store`.
///
/// A missing upload, a name without the `.csv` suffix, or content that is
/// not UTF-8 rejects the whole run with a single message and no counters.
pub async fn import_students<S>(
    upload: Option<Upload>,
    options: &ImportOptions,
    store: &S,
) -> ImportOutcome
where
    S: StudentStore + ?Sized,
{
    let Some(upload) = upload else {
        return ImportOutcome::rejected(MSG_NO_FILE);
    };
    if !upload.file_name.ends_with(CSV_EXTENSION) {
        return ImportOutcome::rejected(MSG_UNSUPPORTED_FORMAT);
    }
    let text = match std::str::from_utf8(&upload.content) {
        Ok(text) => text,
        Err(e) => return ImportOutcome::rejected(format!("Error processing CSV file: {e}")),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut tally = ImportTally::default();
    let mut first = true;

    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line());
                tally.record(RowOutcome::Failed {
                    line,
                    reason: format!("unreadable CSV record: {e}"),
                });
                first = false;
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line());

        if std::mem::take(&mut first) && is_header(&record, options) {
            if options.header == HeaderMode::Detect && looks_like_data(&record, &options.columns) {
                let fields: Vec<&str> = record.iter().collect();
                tally.messages.push(Diagnostic {
                    level: DiagnosticLevel::Warning,
                    line: Some(line),
                    message: format!("Treated first row as header: {fields:?}"),
                });
            }
            continue;
        }

        let outcome = match read_row(&record, &options.columns) {
            RowInput::Empty => RowOutcome::Skipped { line },
            RowInput::Short(raw) => RowOutcome::Incomplete { line, raw },
            RowInput::Invalid(reason) => RowOutcome::Failed { line, reason },
            RowInput::Ready(student) => match store.create_student(&student).await {
                Ok(profile_id) => RowOutcome::Imported { line, profile_id },
                Err(e) => RowOutcome::Failed {
                    line,
                    reason: e.to_string(),
                },
            },
        };
        tally.record(outcome);
    }

    tally.finish()
}

/// Whether the first record should be discarded as a header.
fn is_header(record: &csv::StringRecord, options: &ImportOptions) -> bool {
    match options.header {
        HeaderMode::Skip => true,
        HeaderMode::None => false,
        HeaderMode::Detect => record
            .get(options.columns.email)
            .map_or(true, |cell| !cell.contains('@')),
    }
}

/// Whether a record dropped as a header still resembles a student row:
/// too short to be the full header, or carrying a parseable birth date.
fn looks_like_data(record: &csv::StringRecord, columns: &ColumnMapping) -> bool {
    record.len() < columns.min_fields()
        || record
            .get(columns.date_of_birth)
            .is_some_and(|cell| parse_date("date_of_birth", cell.trim()).is_ok())
}

enum RowInput {
    Empty,
    Short(String),
    Invalid(String),
    Ready(NewStudent),
}

fn read_row(record: &csv::StringRecord, columns: &ColumnMapping) -> RowInput {
    if record.is_empty() {
        return RowInput::Empty;
    }
    if record.len() < columns.min_fields() {
        let fields: Vec<&str> = record.iter().collect();
        return RowInput::Short(format!("{fields:?}"));
    }

    let field = |index: usize| record.get(index).unwrap_or("").trim().to_string();

    let email = normalize_email(&field(columns.email));
    if let Err(e) = validate_email(&email) {
        return RowInput::Invalid(e.to_string());
    }
    let date_of_birth = match parse_date("date_of_birth", &field(columns.date_of_birth)) {
        Ok(date) => date,
        Err(e) => return RowInput::Invalid(e.to_string()),
    };
    let date_admitted = match parse_date("date_admitted", &field(columns.date_admitted)) {
        Ok(date) => date,
        Err(e) => return RowInput::Invalid(e.to_string()),
    };

    RowInput::Ready(NewStudent {
        email,
        password: field(columns.password),
        profile: ProfileFields {
            first_name: field(columns.first_name),
            other_name: field(columns.other_name),
            last_name: field(columns.last_name),
            gender: field(columns.gender),
            student_class: field(columns.student_class),
            date_of_birth,
            date_admitted,
            address: field(columns.address),
        },
        mugshot: None,
    })
}
