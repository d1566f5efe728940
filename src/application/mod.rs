//! Application layer: data sources and the interactive session
//!
//! This layer feeds the domain with trees and drives its mutations from input events.

pub mod error;
pub mod error_ext;
pub mod session;
pub mod sources;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use session::{Flow, Frame, InputEvent, Selection, Session};
pub use sources::{DataSource, DatasetSource, FileSystemSource};
