use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::{
        auth::{CurrentUser, LoginResponse},
        orders::{AdminOrderRow, OrderDetail, UpdateOrderStatusResponse},
        products::{StockLevel, UploadResponse},
        users::AdminUserRow,
    },
    error::FieldErrors,
    models::{Category, Product, ServiceArea},
};

use super::images::{ImageSet, PendingImage};
use super::list::{ListPage, ListQuery, decode_list};
use super::session::Session;

/// Client-side failure taxonomy. Every request resolves to either a typed
/// payload or one of these; nothing propagates further.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Server(String),

    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response format")]
    UnexpectedFormat,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<FieldErrors>,
}

const GENERIC_FAILURE: &str = "The server could not complete the request.";

/// Map a non-success response to a [`ClientError`]. A 401 clears the session
/// token before reporting expiry.
pub fn map_error_response(status: StatusCode, body: &str, session: &Session) -> ClientError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|b| b.message.clone());
    match status {
        StatusCode::UNAUTHORIZED => {
            session.clear();
            ClientError::SessionExpired
        }
        StatusCode::NOT_FOUND => {
            ClientError::NotFound(message.unwrap_or_else(|| "Not found".to_string()))
        }
        StatusCode::CONFLICT => {
            ClientError::Conflict(message.unwrap_or_else(|| GENERIC_FAILURE.to_string()))
        }
        StatusCode::BAD_REQUEST => match parsed.and_then(|b| b.errors) {
            Some(errors) => ClientError::Validation(errors),
            None => ClientError::Server(message.unwrap_or_else(|| GENERIC_FAILURE.to_string())),
        },
        _ => ClientError::Server(message.unwrap_or_else(|| GENERIC_FAILURE.to_string())),
    }
}

/// Draft of a product form, minus its image list (the [`ImageSet`] carries
/// that).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub cost_price: Option<i64>,
    pub category_id: Option<Uuid>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let builder = match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let response = builder.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(ClientError::Network)?;
        if !status.is_success() {
            return Err(map_error_response(status, &body, &self.session));
        }
        serde_json::from_str(&body).map_err(|_| ClientError::UnexpectedFormat)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.expect_json(self.http.get(self.url(path)).query(query))
            .await
    }

    /// Fetch a management list, absorbing both the paginated and the legacy
    /// bare-array response shapes.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<ListPage<T>, ClientError> {
        let value: serde_json::Value = self.get_json(path, &query.to_pairs()).await?;
        decode_list(value)
    }

    // --- auth ---

    /// Log in and store the returned token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let resp: LoginResponse = self
            .expect_json(
                self.http
                    .post(self.url("/auth/login"))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.session.store(resp.token);
        Ok(())
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ClientError> {
        self.get_json("/auth/me", &[]).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .expect_json(self.http.post(self.url("/auth/change-password")).json(&json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            })))
            .await?;
        Ok(())
    }

    // --- management lists ---

    pub async fn list_categories(
        &self,
        query: &ListQuery,
    ) -> Result<ListPage<Category>, ClientError> {
        self.fetch_list("/admin/categories", query).await
    }

    pub async fn list_products(&self, query: &ListQuery) -> Result<ListPage<Product>, ClientError> {
        self.fetch_list("/admin/products", query).await
    }

    pub async fn list_orders(
        &self,
        query: &ListQuery,
    ) -> Result<ListPage<AdminOrderRow>, ClientError> {
        self.fetch_list("/admin/orders", query).await
    }

    pub async fn list_users(&self, query: &ListQuery) -> Result<ListPage<AdminUserRow>, ClientError> {
        self.fetch_list("/admin/users", query).await
    }

    pub async fn list_service_zones(&self) -> Result<Vec<ServiceArea>, ClientError> {
        self.get_json("/admin/serviceareas", &[]).await
    }

    // --- single entities ---

    pub async fn get_order(&self, id: Uuid) -> Result<OrderDetail, ClientError> {
        self.get_json(&format!("/admin/orders/{id}"), &[]).await
    }

    pub async fn update_order_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<UpdateOrderStatusResponse, ClientError> {
        self.expect_json(
            self.http
                .put(self.url(&format!("/admin/orders/{id}/status")))
                .json(&json!({ "status": status })),
        )
        .await
    }

    /// Submit a signed stock delta; the server computes the resulting stock.
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        adjustment: i32,
    ) -> Result<StockLevel, ClientError> {
        self.expect_json(
            self.http
                .post(self.url(&format!("/admin/products/{product_id}/adjust-stock")))
                .json(&json!({ "adjustment": adjustment })),
        )
        .await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .expect_json(self.http.delete(self.url(&format!("/admin/products/{id}"))))
            .await?;
        Ok(())
    }

    // --- images ---

    pub async fn upload_images(
        &self,
        images: &[PendingImage],
    ) -> Result<Vec<String>, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for image in images {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(ClientError::Network)?;
            form = form.part("productImages", part);
        }
        let resp: UploadResponse = self
            .expect_json(self.http.post(self.url("/admin/upload")).multipart(form))
            .await?;
        Ok(resp.image_urls)
    }

    /// Save a product form: newly selected files are uploaded first, and the
    /// entity save is aborted when the upload fails. The final image list is
    /// the remaining persisted URLs followed by the freshly uploaded ones.
    pub async fn save_product(
        &self,
        existing: Option<Uuid>,
        draft: &ProductDraft,
        images: &ImageSet,
    ) -> Result<Product, ClientError> {
        let uploaded = if images.pending().is_empty() {
            Vec::new()
        } else {
            self.upload_images(images.pending()).await?
        };
        let image_urls = images.final_urls(uploaded);

        let mut payload =
            serde_json::to_value(draft).map_err(|_| ClientError::UnexpectedFormat)?;
        payload["imageUrls"] = json!(image_urls);

        match existing {
            Some(id) => {
                self.expect_json(
                    self.http
                        .put(self.url(&format!("/admin/products/{id}")))
                        .json(&payload),
                )
                .await
            }
            None => {
                self.expect_json(self.http.post(self.url("/admin/products")).json(&payload))
                    .await
            }
        }
    }
}
