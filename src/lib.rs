//#![allow(dead_code)]
#![forbid(unsafe_code, unused)]

pub mod bsp;
pub mod cluster;
pub mod edge;
pub mod errors;
pub mod face;
pub mod float_types;
pub mod mesh;
pub mod plane;
pub mod polygon;
pub mod polyhedron;
pub mod render;
pub mod shapes;
pub mod vertex;
