pub mod errors;
pub mod eth_rpc;
pub mod target;
