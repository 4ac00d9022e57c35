pub mod bilingual;
pub mod cart;
pub mod cart_item;
pub mod owner;

pub use bilingual::*;
pub use cart::*;
pub use cart_item::*;
pub use owner::*;
