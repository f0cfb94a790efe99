//! Data model for device match rating.
//!
//! Types shared by every stage of the rating workflow: the loaded dataset,
//! its rows, the rating labels, and the id range a session covers.

pub mod dataset;
pub mod error;
pub mod range;
pub mod rating;

pub use dataset::{
    COL_FDA_COMPANY, COL_FDA_DEVICE, COL_HUMAN, COL_ID, COL_OPD_COMPANY, COL_OPD_DEVICE,
    Dataset, DatasetIdentity, MatchRecord, Position, REQUIRED_COLUMNS,
};
pub use error::{ModelError, Result};
pub use range::IdRange;
pub use rating::Rating;
