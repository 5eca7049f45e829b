pub mod chunk;
pub mod describe;
