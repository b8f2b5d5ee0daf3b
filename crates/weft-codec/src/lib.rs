//! # Weft Codec - Parameter Codecs for Weft Templates
//!
//! Every parameter a weft template declares carries a [`Codec`]: a
//! decode/encode pair between external input (a JSON value) and template
//! text, plus a read-only [`Schema`] describing its constraints. Decoding
//! failures are reported as structured [`Issue`]s so that a renderer can
//! accumulate every problem in a parameter record before giving up.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use weft_codec::{scalar, Codec, IssueKind};
//!
//! let timeout = scalar::duration();
//! let typed = timeout.decode(Some(&json!("90s"))).unwrap();
//! assert_eq!(timeout.encode(&typed).unwrap(), "1m30s");
//!
//! let issues = timeout.decode(Some(&json!("30x"))).unwrap_err();
//! assert_eq!(issues[0].kind, IssueKind::Transform);
//! ```
//!
//! ## Catalog
//!
//! [`scalar`] provides `text`, `raw`, `int`, `number`, `boolean`, `uuid`,
//! `ulid`, `date`, `datetime`, `duration`, `bigint` and `json` codecs.
//! Applications implement [`Codec`] for anything else.

mod codec;
pub mod duration;
mod error;
mod issue;
pub mod scalar;
mod schema;
mod typed;

pub use codec::{same_contract, Codec, SharedCodec};
pub use duration::{format_duration, parse_duration, DurationError};
pub use error::{CodecError, Result};
pub use issue::{json_type_name, Issue, IssueKind};
pub use scalar::{ScalarCodec, ScalarKind};
pub use schema::Schema;
pub use typed::Typed;
