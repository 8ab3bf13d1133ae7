use crate::{
    entities::commerce::{
        cart, cart_item, Cart, CartItem, CartItemModel, CartModel, Product, ProductModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Per-user shopping carts.
///
/// Lines are keyed on `(product, size)`: adding a pair that is already in
/// the cart increments that line instead of appending a new one. A cart
/// that loses its last line is deleted.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

/// Cart line with its product populated; `product` is `None` once the
/// product has been deleted from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItemModel,
    pub product: Option<ProductModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartWithItems {
    pub cart: CartModel,
    pub items: Vec<CartLine>,
}

/// Outcome of removing lines from a cart
#[derive(Debug, Clone, PartialEq)]
pub enum CartRemoval {
    Updated(CartWithItems),
    /// The last line was removed and the cart itself deleted
    CartDeleted(Uuid),
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_cart_for_user(&self, user_id: &str) -> Result<CartWithItems, ServiceError> {
        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for user {user_id} not found")))?;

        self.load_cart(&*self.db, cart).await
    }

    /// Adds `quantity` of `(product, size)` to the user's cart, creating the
    /// cart on first use.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, input: AddToCartInput) -> Result<CartWithItems, ServiceError> {
        let user_id = input.user_id.trim();
        if user_id.is_empty() {
            return Err(ServiceError::ValidationError(
                "userId is required".to_string(),
            ));
        }
        check_quantity(input.quantity)?;
        let size = input.size.trim();
        if size.is_empty() {
            return Err(ServiceError::ValidationError("size is required".to_string()));
        }

        let product = find_product(&*self.db, input.product_id).await?;
        check_options(&product, size, input.color.as_deref())?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let cart = match Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
        {
            Some(cart) => cart,
            None => {
                info!("Creating cart for user {}", user_id);
                cart::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id.to_string()),
                    size: Set(Some(size.to_string())),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        let existing_line = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product.id))
            .filter(cart_item::Column::Size.eq(size))
            .one(&txn)
            .await?;

        match existing_line {
            Some(line) => {
                let quantity = merge_quantities(line.quantity, input.quantity)?;
                let mut active: cart_item::ActiveModel = line.into();
                active.quantity = Set(quantity);
                if input.color.is_some() {
                    active.color = Set(input.color.clone());
                }
                active.updated_at = Set(now);
                active.update(&txn).await?;
                counter!("storefront_cart.lines_merged", 1);
            }
            None => {
                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(product.id),
                    quantity: Set(input.quantity),
                    size: Set(size.to_string()),
                    color: Set(input.color.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
                counter!("storefront_cart.lines_added", 1);
            }
        }

        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        info!(
            "Added {} x {} (size {}) to cart {}",
            input.quantity, product.id, size, cart.id
        );
        self.load_cart(&*self.db, cart).await
    }

    /// Changes quantity, size or color of the line `(cart, product, size)`.
    ///
    /// Moving a line to a size the cart already holds for the same product
    /// merges the two lines.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        input: UpdateCartItemInput,
    ) -> Result<CartWithItems, ServiceError> {
        if let Some(quantity) = input.quantity {
            check_quantity(quantity)?;
        }

        let cart = find_cart(&*self.db, input.cart_id).await?;
        let product = find_product(&*self.db, input.product_id).await?;

        let new_size = input
            .new_size
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        check_options(
            &product,
            new_size.unwrap_or(&input.size),
            input.color.as_deref(),
        )?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let line = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product.id))
            .filter(cart_item::Column::Size.eq(input.size.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Product {} with size {} is not in cart {}",
                    product.id, input.size, cart.id
                ))
            })?;

        let quantity = input.quantity.unwrap_or(line.quantity);
        let merge_into = match new_size {
            Some(size) if size != line.size => {
                CartItem::find()
                    .filter(cart_item::Column::CartId.eq(cart.id))
                    .filter(cart_item::Column::ProductId.eq(product.id))
                    .filter(cart_item::Column::Size.eq(size))
                    .one(&txn)
                    .await?
            }
            _ => None,
        };

        if let Some(other) = merge_into {
            let merged = merge_quantities(other.quantity, quantity)?;
            let mut active: cart_item::ActiveModel = other.into();
            active.quantity = Set(merged);
            if input.color.is_some() {
                active.color = Set(input.color.clone());
            }
            active.updated_at = Set(now);
            active.update(&txn).await?;
            line.delete(&txn).await?;
            counter!("storefront_cart.lines_merged", 1);
        } else {
            let mut active: cart_item::ActiveModel = line.into();
            active.quantity = Set(quantity);
            if let Some(size) = new_size {
                active.size = Set(size.to_string());
            }
            if input.color.is_some() {
                active.color = Set(input.color.clone());
            }
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        self.load_cart(&*self.db, cart).await
    }

    /// Removes the line for `(product, size)`, or every line of the product
    /// when `size` is `None`.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        size: Option<&str>,
    ) -> Result<CartRemoval, ServiceError> {
        let cart = find_cart(&*self.db, cart_id).await?;

        let txn = self.db.begin().await?;

        let mut delete = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id));
        if let Some(size) = size {
            delete = delete.filter(cart_item::Column::Size.eq(size));
        }
        let removed = delete.exec(&txn).await?.rows_affected;

        if removed == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {product_id} is not in cart {cart_id}"
            )));
        }
        counter!("storefront_cart.lines_removed", removed);

        let remaining = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .count(&txn)
            .await?;

        if remaining == 0 {
            cart.delete(&txn).await?;
            txn.commit().await?;
            info!("Cart {} emptied and deleted", cart_id);
            return Ok(CartRemoval::CartDeleted(cart_id));
        }

        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        Ok(CartRemoval::Updated(self.load_cart(&*self.db, cart).await?))
    }

    /// WhatsApp deep link carrying an order summary of the user's cart.
    #[instrument(skip(self))]
    pub async fn checkout_link(
        &self,
        user_id: &str,
        shop_number: Option<&str>,
    ) -> Result<String, ServiceError> {
        let number: String = shop_number
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if number.is_empty() {
            return Err(ServiceError::BadRequest(
                "WhatsApp checkout is not configured".to_string(),
            ));
        }

        let cart = self.get_cart_for_user(user_id).await?;
        let text = order_summary(&cart);

        let url = url::Url::parse_with_params(
            &format!("{WHATSAPP_BASE_URL}/{number}"),
            &[("text", text)],
        )
        .map_err(|e| ServiceError::InternalError(format!("checkout link: {e}")))?;

        Ok(url.to_string())
    }

    async fn load_cart<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart: CartModel,
    ) -> Result<CartWithItems, ServiceError> {
        let items = cart
            .find_related(CartItem)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(conn)
            .await?;

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, ProductModel> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            Product::find()
                .filter(crate::entities::commerce::product::Column::Id.is_in(product_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let items = items
            .into_iter()
            .map(|item| {
                let product = products.get(&item.product_id).cloned();
                CartLine { item, product }
            })
            .collect();

        Ok(CartWithItems { cart, items })
    }
}

async fn find_cart<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<CartModel, ServiceError> {
    Cart::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Cart", id))
}

async fn find_product<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<ProductModel, ServiceError> {
    Product::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", id))
}

async fn touch<C: ConnectionTrait>(conn: &C, cart: CartModel) -> Result<CartModel, ServiceError> {
    let mut active: cart::ActiveModel = cart.into();
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}

fn check_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::ValidationError(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn merge_quantities(current: i32, added: i32) -> Result<i32, ServiceError> {
    current
        .checked_add(added)
        .ok_or_else(|| ServiceError::ValidationError("quantity is too large".to_string()))
}

/// `size` must be offered by the product, and `color` (when given) must be
/// one of its variant colors.
fn check_options(
    product: &ProductModel,
    size: &str,
    color: Option<&str>,
) -> Result<(), ServiceError> {
    if !product.offers_size(size) {
        return Err(ServiceError::ValidationError(format!(
            "size {} is not available for this product",
            size
        )));
    }
    if let Some(color) = color {
        if !product.offers_color(color) {
            return Err(ServiceError::ValidationError(format!(
                "color {} is not available for this product",
                color
            )));
        }
    }
    Ok(())
}

fn order_summary(cart: &CartWithItems) -> String {
    let mut lines = vec!["Hello! I would like to order:".to_string()];
    let mut total = Decimal::ZERO;

    for line in &cart.items {
        let Some(product) = &line.product else {
            continue;
        };
        let line_total = product.effective_price() * Decimal::from(line.item.quantity);
        total += line_total;

        let color = line
            .item
            .color
            .as_deref()
            .map(|c| format!(", color {c}"))
            .unwrap_or_default();
        lines.push(format!(
            "- {} (size {}{}) x{} = {}",
            product.name, line.item.size, color, line.item.quantity, line_total
        ));
    }

    lines.push(format!("Total: {}", total));
    lines.join("\n")
}

#[derive(Debug, Clone)]
pub struct AddToCartInput {
    pub user_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateCartItemInput {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub size: String,
    pub quantity: Option<i32>,
    pub new_size: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::commerce::{MediaItem, SizeList, Variant, VariantList};
    use rust_decimal_macros::dec;

    fn product() -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            name: "Runner".into(),
            description: String::new(),
            price: dec!(100),
            discounted_price: Some(dec!(80)),
            category_id: Uuid::new_v4(),
            variants: VariantList(vec![Variant {
                color: "Black".into(),
                media: vec![MediaItem {
                    url: "https://cdn.example/black.jpg".into(),
                    public_id: "black".into(),
                }],
            }]),
            sizes: SizeList(vec!["M".into(), "L".into()]),
            tag: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product: &ProductModel, quantity: i32, size: &str, color: Option<&str>) -> CartLine {
        CartLine {
            item: CartItemModel {
                id: Uuid::new_v4(),
                cart_id: Uuid::nil(),
                product_id: product.id,
                quantity,
                size: size.into(),
                color: color.map(str::to_string),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            product: Some(product.clone()),
        }
    }

    #[test]
    fn options_are_checked_against_product() {
        let product = product();
        assert!(check_options(&product, "M", None).is_ok());
        assert!(check_options(&product, "M", Some("black")).is_ok());
        assert!(check_options(&product, "XL", None).is_err());
        assert!(check_options(&product, "L", Some("Red")).is_err());
    }

    #[test]
    fn non_ascii_colors_are_accepted_in_any_case() {
        let mut product = product();
        product.variants.0[0].color = "Écru".into();
        assert!(check_options(&product, "M", Some("écru")).is_ok());
        assert!(check_options(&product, "M", Some("ÉCRU")).is_ok());
        assert!(check_options(&product, "M", Some("ecru")).is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(-3).is_err());
    }

    #[test]
    fn merged_quantity_overflow_is_rejected() {
        assert_eq!(merge_quantities(2, 3).unwrap(), 5);
        assert!(matches!(
            merge_quantities(i32::MAX, 1),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn summary_uses_effective_price_and_skips_missing_products() {
        let product = product();
        let mut orphan = line(&product, 5, "L", None);
        orphan.product = None;

        let cart = CartWithItems {
            cart: CartModel {
                id: Uuid::nil(),
                user_id: "u1".into(),
                size: Some("M".into()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items: vec![line(&product, 2, "M", Some("Black")), orphan],
        };

        let summary = order_summary(&cart);
        assert!(summary.contains("- Runner (size M, color Black) x2 = 160"));
        assert!(summary.ends_with("Total: 160"));
    }
}
