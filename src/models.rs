use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::search::{self, Page};

// ============================================================================
// ENUMS
// ============================================================================

/// Account role (this is also a Postgres enum)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    BusinessOwner,
    Admin,
}

// ============================================================================
// VIEWER CONTEXT
// ============================================================================

/// Identity of the caller, taken from trusted gateway headers.
///
/// Authentication itself happens upstream; this service only consumes the
/// already-verified id/role pair. `None` means an anonymous caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub id: i64,
    pub role: UserRole,
}

impl Viewer {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

// ============================================================================
// BUSINESSES
// ============================================================================

/// Directory listing persisted in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_public: bool,
    pub is_featured: bool,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub resubmitted_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub rating_average: f64,
    pub rating_count: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Helper struct used when inserting a new listing
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub is_public: bool,
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Category with its live listing count, derived per request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub business_count: i64,
}

/// Subcategory with its live listing count, derived per request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubCategorySummary {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub business_count: i64,
}

// ============================================================================
// REVIEWS
// ============================================================================

/// Customer review persisted in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub business_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub helpful_count: i64,
    pub response_comment: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub responded_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Helper struct used when inserting a new review
#[derive(Debug, Clone)]
pub struct NewReview {
    pub business_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub comment: Option<String>,
}

// ============================================================================
// USERS
// ============================================================================

/// Account holder; owns zero or more businesses
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// REQUEST/RESPONSE DTOs
// ============================================================================

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

/// Paged business listing envelope; its shape is fixed by the public API
#[derive(Debug, Serialize)]
pub struct BusinessListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub businesses: Vec<Business>,
}

impl BusinessListResponse {
    pub fn new(businesses: Vec<Business>, total: i64, page: Page) -> Self {
        Self {
            success: true,
            count: businesses.len(),
            total,
            page: page.page,
            pages: search::page_count(total, page.limit),
            businesses,
        }
    }
}

/// Paged review listing envelope
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub reviews: Vec<Review>,
}

impl ReviewListResponse {
    pub fn new(reviews: Vec<Review>, total: i64, page: Page) -> Self {
        Self {
            success: true,
            count: reviews.len(),
            total,
            page: page.page,
            pages: search::page_count(total, page.limit),
            reviews,
        }
    }
}

/// Category listing envelope
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub count: usize,
    pub categories: Vec<CategorySummary>,
}

impl CategoryListResponse {
    pub fn new(categories: Vec<CategorySummary>) -> Self {
        Self {
            success: true,
            count: categories.len(),
            categories,
        }
    }
}

/// Subcategory listing envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryListResponse {
    pub success: bool,
    pub count: usize,
    pub sub_categories: Vec<SubCategorySummary>,
}

impl SubCategoryListResponse {
    pub fn new(sub_categories: Vec<SubCategorySummary>) -> Self {
        Self {
            success: true,
            count: sub_categories.len(),
            sub_categories,
        }
    }
}

/// Aggregated statistics for the admin dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    pub pending: i64,
    pub active: i64,
    pub rejected: i64,
    pub approved_today: i64,
    pub rejected_today: i64,
}

/// Payload sent to create a listing
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 120))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 120))]
    pub country: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 1024))]
    pub website: Option<String>,
    pub is_public: Option<bool>,
}

impl CreateBusinessRequest {
    pub fn into_new_business(self, slug: String, owner_id: Option<i64>) -> NewBusiness {
        NewBusiness {
            name: self.name,
            slug,
            description: self.description,
            category_id: self.category_id,
            sub_category_id: self.sub_category_id,
            owner_id,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
            phone: self.phone,
            email: self.email,
            website: self.website,
            is_public: self.is_public.unwrap_or(true),
        }
    }
}

/// Payload sent to update a listing
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 120))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 120))]
    pub country: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 1024))]
    pub website: Option<String>,
    pub is_public: bool,
}

impl UpdateBusinessRequest {
    pub fn apply_to_existing(&self, existing: &mut Business) {
        existing.name = self.name.clone();
        existing.description = self.description.clone();
        existing.category_id = self.category_id;
        existing.sub_category_id = self.sub_category_id;
        existing.address = self.address.clone();
        existing.city = self.city.clone();
        existing.state = self.state.clone();
        existing.zip_code = self.zip_code.clone();
        existing.country = self.country.clone();
        existing.latitude = self.latitude;
        existing.longitude = self.longitude;
        existing.phone = self.phone.clone();
        existing.email = self.email.clone();
        existing.website = self.website.clone();
        existing.is_public = self.is_public;
        existing.updated_at = Utc::now();
    }
}

/// Admin rejection payload; reason length is checked by the moderation rules
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBusinessRequest {
    pub rejection_reason: String,
}

/// Payload sent to create a review
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub business_id: i64,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_new_review(self, user_id: i64) -> NewReview {
        NewReview {
            business_id: self.business_id,
            user_id,
            rating: self.rating,
            title: self.title,
            comment: self.comment,
        }
    }
}

/// Payload sent to update a review
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn apply_to_existing(&self, existing: &mut Review) {
        existing.rating = self.rating;
        existing.title = self.title.clone();
        existing.comment = self.comment.clone();
        existing.updated_at = Utc::now();
    }
}

/// Owner response attached to a review
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponseRequest {
    #[validate(length(min = 1, max = 2000))]
    pub response_comment: String,
}

/// Admin toggle for a review's approval flag
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub is_approved: bool,
}
