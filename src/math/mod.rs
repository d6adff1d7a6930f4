pub mod constant_product;
pub mod fixed_point;
