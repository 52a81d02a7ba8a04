mod client;
pub mod elpris;
pub mod zaptec;
