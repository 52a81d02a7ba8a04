pub mod cost;
pub mod fee;
pub mod pipeline;
pub mod price;
pub mod session;
pub mod summary;
