//! # Header Engine
//!
//! The core of the tool: comment header formats, the template compiler, and
//! the matching/update engine, plus the text utilities they share.
//!
//! The entry point is [`PreparedHeader`]: compile a [`HeaderTemplate`] under
//! a [`CommentHeaderFormat`] once, then run `check`/`update` against any
//! number of files. Everything here is immutable after construction and safe
//! to share across threads.

pub mod format;
pub mod prepared;
pub mod template;
pub mod text;

pub use format::{CommentHeaderFormat, FormatRegistry, HeaderError};
pub use prepared::{HeaderStatus, PreparedHeader, UpdateOutcome};
pub use template::{HeaderTemplate, TemplateData};
