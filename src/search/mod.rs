//! Vector storage and nearest-neighbour retrieval.

pub mod vector;
