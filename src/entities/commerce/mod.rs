pub mod cart;
pub mod cart_item;
pub mod category;
pub mod header;
pub mod product;
pub mod tag;

pub use cart::{Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use category::{Entity as Category, Gender, Model as CategoryModel};
pub use header::{Entity as Header, Model as HeaderModel};
pub use product::{
    Entity as Product, MediaItem, Model as ProductModel, ProductTag, SizeList, Variant,
    VariantList,
};
pub use tag::{Entity as Tag, Model as TagModel};
