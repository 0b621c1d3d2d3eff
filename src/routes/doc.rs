use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ChangePasswordRequest, CurrentUser, LoginRequest, LoginResponse, RegisterRequest,
            RegisterResponse,
        },
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        orders::{
            AdminOrderRow, OrderDetail, OrderItemRow, UpdateOrderStatusRequest,
            UpdateOrderStatusResponse,
        },
        products::{
            AdjustStockRequest, CreateProductRequest, StockLevel, UpdateProductRequest,
            UploadResponse,
        },
        reports::{DashboardStats, RecentOrder, SalesPoint, UsersPoint},
        users::{AdminUserRow, UserDetail, UserOrderRow},
        zones::CreateServiceAreaRequest,
    },
    models::{Category, CategoryRef, DeliveryInfo, Product, ProductImage, ServiceArea},
    response::{Paginated, PaginationMeta},
    routes::{auth, categories, health, orders, products, reports, service_areas, upload, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::change_password,
        categories::list_categories,
        categories::list_categories_admin,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::list_products_admin,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::adjust_stock,
        upload::upload_images,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        users::list_users,
        users::get_user,
        service_areas::list_service_areas,
        service_areas::create_service_area,
        reports::stats,
        reports::sales_over_time,
        reports::users_over_time,
    ),
    components(
        schemas(
            Category,
            CategoryRef,
            Product,
            ProductImage,
            ServiceArea,
            DeliveryInfo,
            PaginationMeta,
            Paginated<Category>,
            Paginated<Product>,
            Paginated<AdminOrderRow>,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            CurrentUser,
            ChangePasswordRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            AdjustStockRequest,
            StockLevel,
            UploadResponse,
            AdminOrderRow,
            OrderItemRow,
            OrderDetail,
            UpdateOrderStatusRequest,
            UpdateOrderStatusResponse,
            AdminUserRow,
            UserOrderRow,
            UserDetail,
            CreateServiceAreaRequest,
            DashboardStats,
            RecentOrder,
            SalesPoint,
            UsersPoint,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Categories", description = "Storefront category endpoints"),
        (name = "Products", description = "Storefront product endpoints"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
