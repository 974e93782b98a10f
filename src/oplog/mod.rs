//! Textual operation log: parsing `N`/`I`/`L`/`D` lines into requests and
//! rendering a finished batch back to text.

pub mod file;
pub mod parser;
pub mod stream;

pub use file::execute_file;
pub use parser::{OperationLog, parse_header, parse_line, parse_log, parse_request};
pub use stream::{execute_log, execute_stream, header_line, render_output};
