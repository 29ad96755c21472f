pub mod mappings;

/// Computes the key an entry is stored under in its parent's map.
pub trait ToKey<K> {
	fn get_key(&self) -> K;
}
