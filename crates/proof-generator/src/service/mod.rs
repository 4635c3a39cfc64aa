pub mod bundle;
pub mod fetch_proof;
pub mod trie_node;
