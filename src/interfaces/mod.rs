pub mod jsonl;
pub mod rpc;
