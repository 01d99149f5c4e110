pub use derive_custom::Named;
pub use derive_traits::Named;
