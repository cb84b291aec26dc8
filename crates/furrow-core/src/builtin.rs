//! Compiled-in registry for the fertilizer-retail deployment.
//!
//! Product references its category and brand by foreign key
//! (`categoryId → category_id`, `brandId → brand_id`). Deployments still on
//! the denormalised text columns ship their own registry file instead.

use crate::{
  Result,
  registry::{FieldKind as K, FieldSpec, LogicalEntity, Registry},
};

fn req(logical: &str, storage: &str, kind: K) -> FieldSpec {
  FieldSpec::required(logical, storage, kind)
}

fn opt(logical: &str, storage: &str, kind: K) -> FieldSpec {
  FieldSpec::optional(logical, storage, kind)
}

/// Timestamps shared by every table.
fn audited(entity: LogicalEntity) -> LogicalEntity {
  entity
    .field(opt("createdAt", "created_at", K::Date))
    .field(opt("updatedAt", "updated_at", K::Date))
}

fn product() -> LogicalEntity {
  audited(
    LogicalEntity::new("Product")
      .candidate("products", 1)
      .field(opt("id", "id", K::Uuid))
      .field(req("name", "name", K::String))
      .field(opt("sku", "sku", K::String))
      .field(opt("description", "description", K::String))
      .field(opt("categoryId", "category_id", K::Uuid))
      .field(opt("brandId", "brand_id", K::Uuid))
      .field(opt("supplierId", "supplier_id", K::Uuid))
      .field(opt("unit", "unit", K::String))
      .field(req("unitPrice", "unit_price", K::Number))
      .field(opt("costPrice", "cost_price", K::Number))
      .field(req("stockQuantity", "stock_quantity", K::Number))
      .field(opt("minStockLevel", "min_stock_level", K::Number))
      .field(opt("isActive", "is_active", K::Boolean)),
  )
}

fn category() -> LogicalEntity {
  audited(
    LogicalEntity::new("Category")
      .candidate("categories", 1)
      .field(opt("id", "id", K::Uuid))
      .field(req("name", "name", K::String))
      .field(opt("description", "description", K::String))
      .field(opt("sortOrder", "sort_order", K::Number))
      .field(opt("isActive", "is_active", K::Boolean)),
  )
}

fn brand() -> LogicalEntity {
  audited(
    LogicalEntity::new("Brand")
      .candidate("brands", 1)
      .field(opt("id", "id", K::Uuid))
      .field(req("name", "name", K::String))
      .field(opt("description", "description", K::String))
      .field(opt("isActive", "is_active", K::Boolean)),
  )
}

fn supplier() -> LogicalEntity {
  audited(
    LogicalEntity::new("Supplier")
      .candidate("suppliers", 1)
      .field(opt("id", "id", K::Uuid))
      .field(req("name", "name", K::String))
      .field(opt("contactPerson", "contact_person", K::String))
      .field(opt("email", "email", K::String))
      .field(opt("phone", "phone", K::String))
      .field(opt("address", "address", K::String))
      .field(opt("isActive", "is_active", K::Boolean)),
  )
}

fn customer() -> LogicalEntity {
  audited(
    LogicalEntity::new("Customer")
      .candidate("customers", 1)
      .field(opt("id", "id", K::Uuid))
      .field(req("name", "name", K::String))
      .field(opt("email", "email", K::String))
      .field(opt("phone", "phone", K::String))
      .field(opt("address", "address", K::String))
      .field(opt("customerType", "customer_type", K::String))
      .field(opt("creditLimit", "credit_limit", K::Number))
      .field(opt("isActive", "is_active", K::Boolean)),
  )
}

fn sale() -> LogicalEntity {
  audited(
    LogicalEntity::new("Sale")
      .candidate("sales", 1)
      .field(opt("id", "id", K::Uuid))
      .field(opt("saleNumber", "sale_number", K::String))
      .field(opt("customerId", "customer_id", K::Uuid))
      .field(req("saleDate", "sale_date", K::Date))
      .field(opt("subtotal", "subtotal", K::Number))
      .field(opt("taxAmount", "tax_amount", K::Number))
      .field(opt("discountAmount", "discount_amount", K::Number))
      .field(req("totalAmount", "total_amount", K::Number))
      .field(opt("paymentMethod", "payment_method", K::String))
      .field(opt("paymentStatus", "payment_status", K::String))
      .field(opt("notes", "notes", K::String))
      .field(opt("createdBy", "created_by", K::Uuid)),
  )
}

fn sale_item() -> LogicalEntity {
  LogicalEntity::new("SaleItem")
    .candidate("sale_items", 1)
    .candidate("sales_items", 2)
    .field(opt("id", "id", K::Uuid))
    .field(req("saleId", "sale_id", K::Uuid))
    .field(req("productId", "product_id", K::Uuid))
    .field(req("quantity", "quantity", K::Number))
    .field(req("unitPrice", "unit_price", K::Number))
    .field(req("totalPrice", "total_price", K::Number))
    .field(opt("createdAt", "created_at", K::Date))
}

fn purchase() -> LogicalEntity {
  audited(
    LogicalEntity::new("Purchase")
      .candidate("purchases", 1)
      .field(opt("id", "id", K::Uuid))
      .field(opt("purchaseNumber", "purchase_number", K::String))
      .field(req("supplierId", "supplier_id", K::Uuid))
      .field(req("purchaseDate", "purchase_date", K::Date))
      .field(opt("expectedDelivery", "expected_delivery", K::Date))
      .field(req("totalAmount", "total_amount", K::Number))
      .field(opt("status", "status", K::String))
      .field(opt("notes", "notes", K::String))
      .field(opt("metadata", "metadata", K::Json))
      .field(opt("createdBy", "created_by", K::Uuid)),
  )
}

fn purchase_item() -> LogicalEntity {
  LogicalEntity::new("PurchaseItem")
    .candidate("purchase_items", 1)
    .candidate("purchases_items", 2)
    .field(opt("id", "id", K::Uuid))
    .field(req("purchaseId", "purchase_id", K::Uuid))
    .field(req("productId", "product_id", K::Uuid))
    .field(req("quantity", "quantity", K::Number))
    .field(req("unitCost", "unit_cost", K::Number))
    .field(req("totalCost", "total_cost", K::Number))
    .field(opt("createdAt", "created_at", K::Date))
}

fn user_profile() -> LogicalEntity {
  audited(
    LogicalEntity::new("UserProfile")
      .candidate("profiles", 1)
      .candidate("users", 2)
      .candidate("user_profiles", 3)
      .field(req("id", "id", K::Uuid))
      .field(req("email", "email", K::String))
      .field(opt("fullName", "full_name", K::String))
      .field(opt("role", "role", K::String))
      .field(opt("isActive", "is_active", K::Boolean))
      .field(opt("preferences", "preferences", K::Json)),
  )
}

impl Registry {
  /// The compiled-in retail registry.
  pub fn builtin() -> Result<Self> {
    Self::new(vec![
      product(),
      category(),
      brand(),
      supplier(),
      customer(),
      sale(),
      sale_item(),
      purchase(),
      purchase_item(),
      user_profile(),
    ])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_registry_is_valid() {
    let reg = Registry::builtin().unwrap();
    assert_eq!(reg.list_entities().count(), 10);
  }

  #[test]
  fn product_uses_foreign_keys() {
    let reg = Registry::builtin().unwrap();
    let product = reg.get_entity("Product").unwrap();
    assert_eq!(product.field_by_logical("categoryId").unwrap().storage_name, "category_id");
    assert_eq!(product.field_by_logical("brandId").unwrap().storage_name, "brand_id");
    assert!(product.field_by_logical("category").is_none());
  }

  #[test]
  fn user_profile_tries_profiles_first() {
    let reg = Registry::builtin().unwrap();
    let order: Vec<_> = reg
      .get_entity("UserProfile")
      .unwrap()
      .candidates_in_order()
      .into_iter()
      .map(|c| c.table.clone())
      .collect();
    assert_eq!(order, ["profiles", "users", "user_profiles"]);
  }
}
