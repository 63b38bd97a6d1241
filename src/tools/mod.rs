mod graph_tools;

pub use graph_tools::*;
