pub mod datatype;
pub mod row;
pub mod scalar;
