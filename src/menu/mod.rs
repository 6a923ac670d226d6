//! Menu model.
//!
//! A menu is a JSON document mapping state identifiers to node
//! definitions:
//!
//! ```json
//! {
//!   "start": {
//!     "text": "Welcome\n1. Balance\n2. Buy Airtime",
//!     "options": {"1": "balance", "2": "buy_airtime"}
//!   },
//!   "buy_airtime": {
//!     "text": "Enter amount:",
//!     "input_required": true,
//!     "next_state": "confirm"
//!   }
//! }
//! ```

mod model;
mod node;

pub use model::MenuModel;
pub use node::{MenuNode, INPUT_PLACEHOLDER};
