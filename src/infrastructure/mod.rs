pub mod api;
pub mod ipfs;
pub mod multipart;
pub mod session_store;
