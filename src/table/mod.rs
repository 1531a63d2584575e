pub mod argument;
pub mod logger_table;
pub mod table_error;
pub mod threshold;

pub use argument::{Arg, SinkRef, Value};
pub use logger_table::{Entry, Iter, LoggerTable};
pub use table_error::TableError;
pub use threshold::ThresholdLevel;
