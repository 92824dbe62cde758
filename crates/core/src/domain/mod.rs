pub mod cabinet;
pub mod fronts;
pub mod quotation;
