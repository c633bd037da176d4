pub mod driver;
pub mod emit;
pub mod error;
pub mod native;
pub mod scanner;
pub mod segment;
pub mod source;
pub mod tool;

pub use driver::*;
pub use emit::Emitter;
pub use error::{Desync, Error, Result};
pub use scanner::{OtoolScanner, ReadelfScanner, SegmentScanner};
pub use segment::Segment;
pub use source::{LineSource, TextSource, ToolProcess};
pub use tool::{Tool, ToolKind};
