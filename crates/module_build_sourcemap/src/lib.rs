mod finalize;
mod source;
mod source_joiner;

pub use crate::{
  finalize::{finalize_sourcemap, parse_sourcemap},
  source::{line_breaks, Source, SourceMapSource},
  source_joiner::SourceJoiner,
};
pub use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};
