mod corpus;

pub use corpus::*;
