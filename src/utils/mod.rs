pub mod keyed_mutex;
pub mod size;
pub mod unique_name;
pub mod validation;
