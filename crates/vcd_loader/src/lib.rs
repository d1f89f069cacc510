//! Value Change Dump (VCD) loading.
//!
//! This crate parses the VCD text format written by HDL simulators into a
//! [`VcdFile`]: the declared signals keyed by identifier code and, for each,
//! a timeline of decoded values. Files can be loaded in bulk
//! ([`load_vcd_by_filename`]) or streamed one change at a time
//! ([`stream_vcd_by_filename`]); both run the same pipeline and produce the
//! same model.
//!
//! ```no_run
//! let model = vcd_loader::load_vcd_by_filename("trace.vcd")?;
//! for (code, timeline) in model.value_map.iter() {
//!     println!("{code}: {} changes", timeline.len());
//! }
//! # Ok::<(), vcd_loader::VcdFileError>(())
//! ```

#![warn(missing_docs)]

pub mod changes;
pub mod code_map;
pub mod declaration;
pub mod error;
pub mod header;
pub mod loader;
pub mod model;
pub mod position;
pub mod scanner;
pub mod scope;
pub mod stream;
pub mod timescale;
pub mod token;
pub mod value;

pub use code_map::{CodeMap, ValueMap, VariableMap};
pub use declaration::{Alias, BitRange, Declaration, IdCode, VarKind};
pub use error::{ErrorKind, HeaderError, ScanError, StreamError, StreamErrorKind, VcdFileError};
pub use header::HeaderInfo;
pub use loader::{
    load_many, load_reader, load_vcd, load_vcd_by_filename, load_with_config,
    stream_vcd_by_filename,
};
pub use model::VcdFile;
pub use position::Position;
pub use scope::{Scope, ScopeKind, ScopeTree, ScopeVar};
pub use stream::VcdStream;
pub use timescale::{TimeUnit, Timescale};
pub use value::{TimedValue, Timeline, Value, ValueChange};
pub use vcd_common::{Logic, LogicVec};
pub use vcd_config::{LoadMode, LoaderConfig};
