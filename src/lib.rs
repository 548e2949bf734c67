//! Qozy client
//!
//! Command line access to a Qozy home automation daemon, and the
//! schema-driven prompter used to fill in bridge settings interactively.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use qozy_client::{SchemaPrompter, StreamIo};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "integer" }
//!     },
//!     "required": ["name"]
//! });
//!
//! // Answers a terminal user would type, one per line.
//! let mut io = StreamIo::new(Cursor::new("Alice\n30\n"), Vec::new());
//! let value = SchemaPrompter::new(&mut io).read_document(&schema).unwrap();
//!
//! assert_eq!(value, json!({ "name": "Alice", "age": 30 }));
//! ```
//!
//! # Dispatch
//!
//! | Schema | Question |
//! |--------|----------|
//! | `const` | none, the constant is returned |
//! | `enum` | numbered menu of the values |
//! | `oneOf` / `anyOf` | numbered menu of branch titles, then the chosen branch |
//! | `string` | free text |
//! | `number` / `integer` | integer, else floating point |
//! | `boolean` | `y` / `n` |
//! | `object` | each property in declaration order |
//! | `array` | "Add entry?" before every element |

mod error;
mod line_io;
mod models;
mod prompter;
mod schema;
mod style;
mod validator;
mod writer;

#[cfg(feature = "remote")]
mod client;

pub use error::{PromptError, SchemaError, ValidateError, ValidationIssue};
pub use line_io::{LineIo, StreamIo};
pub use models::{display_field, Bridge, Channel, Notification, Rule, ServerInfo, Thing, Trigger};
pub use prompter::SchemaPrompter;
pub use schema::{json_type_name, Property, SchemaKind, SchemaNode, UnionKeyword, Variant};
pub use style::{colored_bool, colorize, italic, underline, Color, Decoration, Styled};
pub use validator::validate;
pub use writer::{CliWriter, Dict, List, Table};

#[cfg(feature = "remote")]
pub use client::{Client, CLIENT_VERSION};
#[cfg(feature = "remote")]
pub use error::ClientError;
