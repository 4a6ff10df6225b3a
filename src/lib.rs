//! jphmind: mindmap editing engine
//!
//! Layers, innermost first:
//! - `domain`: arena tree, history log, selection, tree builder
//! - `application`: the edit engine and its renderer seam
//! - `infrastructure`: filesystem, JSON persistence, service wiring
//! - `cli`: command line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
