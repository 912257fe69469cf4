pub mod error;
pub mod feedback;
pub mod taxonomy;
