//! Configuration for rule sets.
//!
//! Rule sets are plain JSON documents mapping action names to ordered rule
//! lists. Each rule pairs a declarative [`Condition`](gate_policy::Condition)
//! with the message shown when it does not hold:
//!
//! ```json
//! {
//!   "actions": {
//!     "book_hotel": [
//!       {
//!         "name": "max_guests",
//!         "message": "Maximum 10 guests per booking",
//!         "condition": { "kind": "compare", "field": "guests", "op": "le", "value": 10 }
//!       }
//!     ]
//!   }
//! }
//! ```

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigResult, from_json_str, load_file};
pub use schema::{RuleConfig, RuleSetConfig};
