mod bounding_box;
mod transform;

pub use bounding_box::*;
pub use transform::*;

pub use chrono;
pub use float_cmp;
pub use indoc;
pub use itertools;
pub use log;
pub use nalgebra;
pub use serde_json;
pub use serde_yaml;
pub use thiserror;
pub use walkdir;
