//! Decomposition of Web of Science export fields into relational rows:
//! author/address links, resolved USA and China addresses, classified
//! cited references, reprint authors and funding grants.

pub mod address;
pub mod author;
pub mod common;
pub mod grant;
pub mod record;
pub mod reference;
pub mod reprint;

pub use address::{AddressResolver, ResolvedAddress, StateCodes};
pub use record::{decompose_record, DecomposedRecord, RawRecord};
