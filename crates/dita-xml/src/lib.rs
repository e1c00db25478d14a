//! XML helpers for writing DITA topics.
//!
//! This crate covers the small amount of XML handling the phrase generator
//! needs on top of [`quick-xml`]:
//!
//! - [`escape_text`]: escaping for element content
//! - [`is_valid_id`]: the name-token check applied to topic ids
//! - [`check`] / [`check_fragment`]: a well-formedness check that returns an
//!   [`XmlDocument`] tree, used before output is written and by tests that
//!   inspect generated topics
//!
//! # Example
//!
//! ```rust
//! use dita_xml::{check, escape_text, is_valid_id};
//!
//! assert!(is_valid_id("product-attributes"));
//!
//! let title = escape_text("R&D");
//! let doc = check(&format!("<concept id=\"c\"><title>{title}</title></concept>")).unwrap();
//!
//! let title = doc.root.get_child("title").unwrap();
//! assert_eq!(title.text_content(), "R&D");
//! ```

pub mod error;
pub mod escape;
pub mod name;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use escape::escape_text;
pub use name::is_valid_id;
pub use parser::{check, check_fragment};
pub use types::{XmlAttribute, XmlChild, XmlDocument, XmlElement};
