pub mod feedback;
pub mod product;
pub mod sale;
pub mod user;
