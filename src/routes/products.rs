/// Catalog Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::domain::NewProduct;
use crate::error::{AppError, ValidationError};
use crate::services::CatalogService;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// POST /admin/addproduct (authenticated)
pub async fn add_product(
    form: web::Json<NewProduct>,
    user: web::ReqData<AuthenticatedUser>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let product = catalog.add_product(form.into_inner()).await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %product.product_id,
        "Product inserted"
    );

    Ok(HttpResponse::Created().json(product))
}

/// GET /users/productview
pub async fn product_view(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let products = catalog.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /users/search?name=<pattern>
pub async fn search_product(
    query: web::Query<SearchQuery>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let name = query
        .into_inner()
        .name
        .ok_or_else(|| ValidationError::EmptyField("name".to_string()))?;

    let products = catalog.search(&name).await?;
    Ok(HttpResponse::Ok().json(products))
}
