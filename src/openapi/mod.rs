use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StockLedger API",
        version = "1.0.0",
        description = r#"
# StockLedger API

Inventory backend with an append-only stock ledger: every quantity change
on a catalog item is recorded as an immutable ledger entry, and the item's
stored quantity always equals the sum of its entries.

## Features

- **Item Catalog**: Soft-deleted items, merge-by-name resubmission
- **Stock Ledger**: Append-only audit trail of every stock movement
- **Sales**: Multi-line sales with price snapshots and derived references
- **Purchases**: Stock intake with supplier attribution and item auto-creation
- **Suppliers**: Directory with soft delete and reactivation
- **Actors**: Lightweight user records for ledger attribution

## Error Handling

Errors use a consistent JSON envelope with appropriate HTTP status codes:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock for item 3: delta -5 would leave -2",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "items", description = "Item catalog and stock adjustment endpoints"),
        (name = "ledger", description = "Stock ledger endpoints"),
        (name = "sales", description = "Sale recording endpoints"),
        (name = "purchases", description = "Purchase recording endpoints"),
        (name = "suppliers", description = "Supplier directory endpoints"),
        (name = "users", description = "Actor record endpoints")
    ),
    paths(
        // Items
        crate::handlers::items::submit_item,
        crate::handlers::items::get_item,
        crate::handlers::items::list_items,
        crate::handlers::items::list_all_items,
        crate::handlers::items::update_item,
        crate::handlers::items::adjust_stock,
        crate::handlers::items::retire_item,

        // Ledger
        crate::handlers::ledger::list_entries,

        // Sales
        crate::handlers::sales::record_sale,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,

        // Purchases
        crate::handlers::purchases::record_purchase,
        crate::handlers::purchases::list_purchases,

        // Suppliers
        crate::handlers::suppliers::submit_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::retire_supplier,

        // Users
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
    ),
    components(
        schemas(
            // Item types
            crate::handlers::items::SubmitItemRequest,
            crate::handlers::items::UpdateItemRequest,
            crate::handlers::items::AdjustStockRequest,

            // Sale types
            crate::handlers::sales::RecordSaleRequest,
            crate::handlers::sales::SaleLineRequest,

            // Purchase types
            crate::handlers::purchases::RecordPurchaseRequest,

            // Supplier and user types
            crate::handlers::suppliers::SubmitSupplierRequest,
            crate::handlers::users::CreateUserRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
