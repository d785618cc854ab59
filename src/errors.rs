use chrono::NaiveDate;
use fractic_server_error::{define_client_error, define_internal_error};

use crate::entities::{Beneficiary, EntryId, SourceRef};

// IO-related.
define_client_error!(ReadError, "Error reading file.");
define_internal_error!(WriteError, "Error writing file '{path}'.", { path: &str });

// Parsing-related.
define_client_error!(InvalidCsv, "Invalid CSV format.");
define_client_error!(InvalidCsvContent, "Invalid CSV content: {details}.", { details: &str });
define_client_error!(InvalidRon, "Invalid {ron_type} (invalid RON format).", { ron_type: &str });
define_client_error!(InvalidJson, "Invalid {json_type} (invalid JSON format).", { json_type: &str });
define_client_error!(InvalidIsoDate, "Invalid ISO date: {date}.", { date: &str });
define_client_error!(InvalidIsoCurrencyCode, "Invalid ISO currency code: {code}.", { code: &str });
define_client_error!(
    InvalidDecimalAmount,
    "Invalid decimal amount: '{value}'.",
    { value: &str }
);
define_client_error!(
    InvalidCode,
    "Invalid {field} value: '{value}'.",
    { field: &str, value: &str }
);

// Filter validation.
define_client_error!(
    InvalidPeriodMonth,
    "Invalid month '{month}': use the \"MM\" format (01-12).",
    { month: &str }
);
define_client_error!(
    InvalidPeriodYear,
    "Invalid year '{year}': use the \"YYYY\" format.",
    { year: &str }
);
define_client_error!(
    InvalidDateRange,
    "Invalid date range: end date ({end}) is before start date ({start}).",
    { start: &NaiveDate, end: &NaiveDate }
);

// Ledger-related.
define_client_error!(
    DuplicateEntry,
    "A commission entry already exists for source '{source}' and beneficiary '{beneficiary}'.",
    { source: &SourceRef, beneficiary: &Beneficiary }
);
define_client_error!(
    LedgerEntryNotFound,
    "Commission entry {id} does not exist.",
    { id: &EntryId }
);
define_client_error!(
    ConcurrentModification,
    "Commission entry {id} was modified by another operator (expected revision {expected}, found {found}).",
    { id: &EntryId, expected: u64, found: u64 }
);
define_internal_error!(
    LedgerInvariantViolated,
    "Commission entry {id} violates the ledger invariants: {details}.",
    { id: &EntryId, details: &str }
);
define_internal_error!(LedgerLockPoisoned, "Ledger table lock is poisoned.");

// Document-related.
define_client_error!(InvoiceNotFound, "Invoice '{id}' does not exist.", { id: &str });
define_client_error!(SaleOrderNotFound, "Sale order '{id}' does not exist.", { id: &str });
define_client_error!(
    DuplicateDocument,
    "Document '{id}' is defined more than once.",
    { id: &str }
);
define_client_error!(
    OrphanDocumentLine,
    "Line '{line}' references unknown document '{document}'.",
    { line: &str, document: &str }
);
define_client_error!(
    DuplicateDocumentLine,
    "Line '{line}' is defined more than once in document '{document}'.",
    { line: &str, document: &str }
);
define_internal_error!(DocumentStoreLockPoisoned, "Document store lock is poisoned.");
