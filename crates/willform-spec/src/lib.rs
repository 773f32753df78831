#![allow(missing_docs)]

pub mod answers;
pub mod collect;
pub mod completion;
pub mod condition;
pub mod export;
pub mod interpolate;
pub mod sanitize;
pub mod schema;
pub mod uk;
pub mod walk;

pub use answers::{AnswerStore, AnswerValue, Record, Scalar};
pub use collect::{ResolvedClause, collect_all_clauses, collect_clauses};
pub use completion::{
    FailurePolicy, is_form_complete, is_form_complete_with, is_section_complete,
    unsatisfied_fields,
};
pub use condition::{ClauseOp, Condition, Conditions, Junction, evaluate};
pub use export::{ExportDocument, SummaryEntry, prepare_export};
pub use interpolate::{Placeholder, contains_placeholder, interpolate, strip_placeholders};
pub use sanitize::{is_binary_payload, sanitize_text};
pub use schema::{FieldKind, FieldSpec, FormSchema, OptionSpec, SchemaError, SectionSpec};
pub use walk::{ActiveField, active_fields, active_section_fields};
