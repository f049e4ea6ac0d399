pub mod accounts;
pub mod predictions;
pub mod similarity;
