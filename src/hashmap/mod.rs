mod store;

pub use store::HashMapStore;
