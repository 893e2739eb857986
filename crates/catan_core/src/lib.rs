pub mod aggregate;
pub mod assemble;
pub mod consistency;
pub mod core_api;
pub mod decode;
pub mod extra_points;
pub mod filter;
pub mod model;
pub mod profile;
pub mod reader;
