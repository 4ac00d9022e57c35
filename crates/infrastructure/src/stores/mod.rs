pub mod file_guest_store;
pub mod http_cart_store;

pub use file_guest_store::FileGuestStore;
pub use http_cart_store::HttpCartStore;
