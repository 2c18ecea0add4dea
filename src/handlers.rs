use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;

use crate::clients::notify::NotifyClient;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiResponse, Business, BusinessListResponse, CategoryListResponse, CreateBusinessRequest,
    CreateReviewRequest, ModerateReviewRequest, RejectBusinessRequest, ReviewListResponse,
    ReviewResponseRequest, SubCategoryListResponse, UpdateBusinessRequest, UpdateReviewRequest,
    UserRole, Viewer,
};
use crate::moderation::{self, ListingStatus, TransitionError};
use crate::rate_limit;
use crate::search::{self, Page, SearchQuery, Sort};

// ============================================================================
// VIEWER CONTEXT
// ============================================================================

/// Read the trusted gateway headers into a viewer context.
///
/// Requests without an `X-Actor-Id` header are anonymous. A missing or
/// unrecognized `X-Actor-Role` downgrades to the plain user role rather
/// than failing the request.
fn extract_viewer(req: &HttpRequest) -> Option<Viewer> {
    let id = req
        .headers()
        .get("X-Actor-Id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())?;

    let role = req
        .headers()
        .get("X-Actor-Role")
        .and_then(|value| value.to_str().ok())
        .map(parse_role)
        .unwrap_or(UserRole::User);

    Some(Viewer { id, role })
}

fn parse_role(value: &str) -> UserRole {
    match value.trim() {
        "admin" => UserRole::Admin,
        "business_owner" => UserRole::BusinessOwner,
        _ => UserRole::User,
    }
}

fn require_viewer(req: &HttpRequest) -> Result<Viewer, ApiError> {
    extract_viewer(req).ok_or(ApiError::Unauthorized)
}

fn require_admin(req: &HttpRequest) -> Result<Viewer, ApiError> {
    let viewer = require_viewer(req)?;
    if !viewer.is_admin() {
        return Err(ApiError::Forbidden("Administrator access required"));
    }
    Ok(viewer)
}

/// Rate limit bucket key for the calling client.
fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Owners manage their own listings; admins manage everything.
fn can_manage(viewer: &Viewer, business: &Business) -> bool {
    viewer.is_admin() || business.owner_id == Some(viewer.id)
}

/// Visibility rule for direct fetches: active public listings are visible to
/// everyone, anything else only to the owner or an admin.
fn business_visible_to(business: &Business, viewer: Option<&Viewer>) -> bool {
    if business.is_active && business.is_public {
        return true;
    }
    match viewer {
        Some(viewer) => viewer.is_admin() || business.owner_id == Some(viewer.id),
        None => false,
    }
}

/// Notification recipient for a listing, when one is known. Lookup failures
/// are logged and treated as "no recipient".
async fn owner_email(db: &Database, business: &Business) -> Option<String> {
    let owner_id = business.owner_id?;
    match db.get_user(owner_id).await {
        Ok(user) => user.map(|u| u.email),
        Err(err) => {
            log::warn!("Failed to look up owner {owner_id} for notification: {err:?}");
            None
        }
    }
}

/// True when the database rejected a write over a duplicate key.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Plain pagination values used by list endpoints that take no filters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query values accepted by the review list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    pub business_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "directory-service",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// ============================================================================
// BUSINESS SEARCH & FETCH
// ============================================================================

/// Search the directory. Anonymous callers see active public listings;
/// owners and admins also see their own or all non-public rows.
#[get("/businesses")]
pub async fn search_businesses(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    rate_limit::check_search(&client_ip(&req))?;

    let query = query.into_inner();
    let viewer = extract_viewer(&req);

    let filter = search::compose_filter(&query, viewer.as_ref());
    let sort = Sort::from_param(query.sort.as_deref());
    let page = Page::from_params(query.page.as_deref(), query.limit.as_deref(), 20);

    let (businesses, total) = db.search_businesses(&filter, sort, page).await?;

    Ok(HttpResponse::Ok().json(BusinessListResponse::new(businesses, total, page)))
}

#[get("/businesses/slug/{slug}")]
pub async fn get_business_by_slug(
    req: HttpRequest,
    db: web::Data<Database>,
    slug: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = slug.into_inner();
    let viewer = extract_viewer(&req);

    let business = db
        .get_business_by_slug(&slug)
        .await?
        .filter(|business| business_visible_to(business, viewer.as_ref()))
        .ok_or(ApiError::NotFound("Business"))?;

    let viewed = db
        .record_view(business.id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(viewed)))
}

#[get("/businesses/{business_id}")]
pub async fn get_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let business_id = business_id.into_inner();
    let viewer = extract_viewer(&req);

    let business = db
        .get_business(business_id)
        .await?
        .filter(|business| business_visible_to(business, viewer.as_ref()))
        .ok_or(ApiError::NotFound("Business"))?;

    let viewed = db
        .record_view(business.id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(viewed)))
}

// ============================================================================
// BUSINESS LIFECYCLE
// ============================================================================

/// Submit a new listing. Every submission starts in the pending state;
/// authenticated submitters become the owner.
#[post("/businesses")]
pub async fn create_business(
    req: HttpRequest,
    db: web::Data<Database>,
    notify: web::Data<NotifyClient>,
    payload: web::Json<CreateBusinessRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = extract_viewer(&req);
    let body = payload.into_inner();

    body.validate()
        .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

    if !db.category_exists(body.category_id).await? {
        return Err(ApiError::Validation("Unknown category".into()));
    }
    if let Some(sub_category_id) = body.sub_category_id {
        if !db
            .subcategory_in_category(sub_category_id, body.category_id)
            .await?
        {
            return Err(ApiError::Validation(
                "Unknown subcategory for this category".into(),
            ));
        }
    }

    let slug = db.unique_slug(&body.name, None).await?;
    let new_business = body.into_new_business(slug, viewer.map(|v| v.id));
    let business = db.insert_business(new_business).await?;

    if let Some(email) = owner_email(&db, &business).await {
        if let Err(err) = notify
            .listing_submitted(email, business.id, business.name.clone())
            .await
        {
            log::warn!("Listing submission notification failed: {err}");
        }
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(business)))
}

/// Edit a listing. An owner editing a rejected listing sends it back to the
/// moderation queue automatically.
#[put("/businesses/{business_id}")]
pub async fn update_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<i64>,
    payload: web::Json<UpdateBusinessRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    body.validate()
        .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

    let mut existing_business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if !can_manage(&viewer, &existing_business) {
        return Err(ApiError::Forbidden("You do not manage this business"));
    }

    if !db.category_exists(body.category_id).await? {
        return Err(ApiError::Validation("Unknown category".into()));
    }
    if let Some(sub_category_id) = body.sub_category_id {
        if !db
            .subcategory_in_category(sub_category_id, body.category_id)
            .await?
        {
            return Err(ApiError::Validation(
                "Unknown subcategory for this category".into(),
            ));
        }
    }

    let was_rejected = moderation::listing_status(&existing_business) == ListingStatus::Rejected;

    if body.name != existing_business.name {
        existing_business.slug = db.unique_slug(&body.name, Some(business_id)).await?;
    }
    body.apply_to_existing(&mut existing_business);

    let mut updated = db.update_business(existing_business).await?;

    if was_rejected && !viewer.is_admin() {
        if let Ok(resubmission) = moderation::resubmit(&updated) {
            updated = db
                .apply_resubmission(business_id, &resubmission)
                .await?
                .ok_or(ApiError::NotFound("Business"))?;
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[delete("/businesses/{business_id}")]
pub async fn delete_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let business_id = business_id.into_inner();

    let business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if !can_manage(&viewer, &business) {
        return Err(ApiError::Forbidden("You do not manage this business"));
    }

    db.delete_business(business_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

// ============================================================================
// MODERATION
// ============================================================================

#[put("/businesses/{business_id}/approve")]
pub async fn approve_business(
    req: HttpRequest,
    db: web::Data<Database>,
    notify: web::Data<NotifyClient>,
    business_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    require_admin(&req)?;
    let business_id = business_id.into_inner();

    let business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    let approval = moderation::approve(&business)?;
    let approved = db
        .apply_approval(business_id, &approval)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if let Some(email) = owner_email(&db, &approved).await {
        if let Err(err) = notify
            .listing_approved(email, approved.id, approved.name.clone())
            .await
        {
            log::warn!("Listing approval notification failed: {err}");
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(approved)))
}

#[put("/businesses/{business_id}/reject")]
pub async fn reject_business(
    req: HttpRequest,
    db: web::Data<Database>,
    notify: web::Data<NotifyClient>,
    business_id: web::Path<i64>,
    payload: web::Json<RejectBusinessRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&req)?;
    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    let business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    let rejection = moderation::reject(&business, &body.rejection_reason)?;
    let rejected = db
        .apply_rejection(business_id, &rejection)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if let Some(email) = owner_email(&db, &rejected).await {
        if let Err(err) = notify
            .listing_rejected(
                email,
                rejected.id,
                rejected.name.clone(),
                rejection.reason.clone(),
            )
            .await
        {
            log::warn!("Listing rejection notification failed: {err}");
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(rejected)))
}

/// Put a rejected listing back into the moderation queue.
#[post("/businesses/{business_id}/resubmit")]
pub async fn resubmit_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let business_id = business_id.into_inner();

    let business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if !can_manage(&viewer, &business) {
        return Err(ApiError::Forbidden("You do not manage this business"));
    }

    let resubmission = moderation::resubmit(&business)?;
    let resubmitted = db
        .apply_resubmission(business_id, &resubmission)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(resubmitted)))
}

/// Settle the guarded claim write. No row updated means another claimant
/// won the race after our precheck; report it as an owned listing.
fn settle_claim(record: Option<Business>) -> ApiResult<Business> {
    record.ok_or_else(|| TransitionError::AlreadyOwned.into())
}

/// Take ownership of an unclaimed listing. The listing goes back through
/// moderation so the new owner's details get verified.
#[post("/businesses/{business_id}/claim")]
pub async fn claim_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let business_id = business_id.into_inner();

    let business = db
        .get_business(business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    let claim = moderation::claim(&business, viewer.id)?;
    let claimed = settle_claim(db.apply_claim(business_id, &claim).await?)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(claimed)))
}

// ============================================================================
// ADMIN QUEUE & STATS
// ============================================================================

#[get("/admin/businesses/pending")]
pub async fn pending_businesses(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    require_admin(&req)?;
    let query = query.into_inner();

    let page = Page::from_params(query.page.as_deref(), query.limit.as_deref(), 20);
    let (businesses, total) = db.list_pending_businesses(page).await?;

    Ok(HttpResponse::Ok().json(BusinessListResponse::new(businesses, total, page)))
}

#[get("/admin/stats")]
pub async fn directory_stats(req: HttpRequest, db: web::Data<Database>) -> ApiResult<HttpResponse> {
    require_admin(&req)?;

    let stats = db.directory_stats().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

// ============================================================================
// REVIEWS
// ============================================================================

/// Leave a review. One review per caller per business; the listing's rating
/// aggregate is recomputed before the response goes out.
#[post("/reviews")]
pub async fn create_review(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    rate_limit::check_review_submission(&client_ip(&req))?;

    let body = payload.into_inner();

    body.validate()
        .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

    let business = db
        .get_business(body.business_id)
        .await?
        .filter(|business| business_visible_to(business, Some(&viewer)))
        .ok_or(ApiError::NotFound("Business"))?;

    if db
        .get_review_by_author(business.id, viewer.id)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation(
            "You have already reviewed this business".into(),
        ));
    }

    // The unique constraint backstops the precheck under concurrent submits.
    let review = match db.insert_review(body.into_new_review(viewer.id)).await {
        Ok(review) => review,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::Validation(
                "You have already reviewed this business".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    };
    db.recompute_business_rating(business.id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(review)))
}

#[get("/reviews")]
pub async fn list_reviews(
    db: web::Data<Database>,
    query: web::Query<ReviewListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();

    let business_id = query
        .business_id
        .as_deref()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::Validation("businessId query parameter is required".into()))?;

    let page = Page::from_params(query.page.as_deref(), query.limit.as_deref(), 10);
    let (reviews, total) = db.list_reviews(business_id, page).await?;

    Ok(HttpResponse::Ok().json(ReviewListResponse::new(reviews, total, page)))
}

#[put("/reviews/{review_id}")]
pub async fn update_review(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<i64>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let review_id = review_id.into_inner();
    let body = payload.into_inner();

    body.validate()
        .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

    let mut existing_review = db
        .get_review(review_id)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    if existing_review.user_id != viewer.id && !viewer.is_admin() {
        return Err(ApiError::Forbidden("You can only edit your own reviews"));
    }

    let rating_changed = existing_review.rating != body.rating;
    body.apply_to_existing(&mut existing_review);

    let updated = db.update_review(existing_review).await?;
    if rating_changed {
        db.recompute_business_rating(updated.business_id).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[delete("/reviews/{review_id}")]
pub async fn delete_review(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let review_id = review_id.into_inner();

    let review = db
        .get_review(review_id)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    if review.user_id != viewer.id && !viewer.is_admin() {
        return Err(ApiError::Forbidden("You can only delete your own reviews"));
    }

    db.delete_review(review_id).await?;
    db.recompute_business_rating(review.business_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/reviews/{review_id}/helpful")]
pub async fn mark_review_helpful(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    require_viewer(&req)?;

    let review = db
        .increment_helpful(review_id.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(review)))
}

/// Attach the business owner's response to a review.
#[post("/reviews/{review_id}/response")]
pub async fn respond_to_review(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<i64>,
    payload: web::Json<ReviewResponseRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = require_viewer(&req)?;
    let review_id = review_id.into_inner();
    let body = payload.into_inner();

    body.validate()
        .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

    let review = db
        .get_review(review_id)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    let business = db
        .get_business(review.business_id)
        .await?
        .ok_or(ApiError::NotFound("Business"))?;

    if !can_manage(&viewer, &business) {
        return Err(ApiError::Forbidden(
            "Only the business owner can respond to reviews",
        ));
    }

    let updated = db
        .set_review_response(review_id, &body.response_comment, viewer.id)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Toggle a review's approval flag. Hiding or restoring a review moves the
/// listing's rating aggregate with it.
#[put("/reviews/{review_id}/moderate")]
pub async fn moderate_review(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<i64>,
    payload: web::Json<ModerateReviewRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&req)?;
    let review_id = review_id.into_inner();
    let body = payload.into_inner();

    let existing_review = db
        .get_review(review_id)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    let changed = existing_review.is_approved != body.is_approved;
    let updated = db
        .set_review_approval(review_id, body.is_approved)
        .await?
        .ok_or(ApiError::NotFound("Review"))?;

    if changed {
        db.recompute_business_rating(updated.business_id).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[get("/categories")]
pub async fn list_categories(db: web::Data<Database>) -> ApiResult<HttpResponse> {
    let categories = db.list_categories().await?;

    Ok(HttpResponse::Ok().json(CategoryListResponse::new(categories)))
}

#[get("/categories/{category_id}/subcategories")]
pub async fn list_subcategories(
    db: web::Data<Database>,
    category_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let category_id = category_id.into_inner();

    if !db.category_exists(category_id).await? {
        return Err(ApiError::NotFound("Category"));
    }

    let sub_categories = db.list_subcategories(category_id).await?;

    Ok(HttpResponse::Ok().json(SubCategoryListResponse::new(sub_categories)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App, ResponseError};
    use chrono::Utc;
    use std::borrow::Cow;

    fn business(owner_id: Option<i64>, is_active: bool, is_public: bool) -> Business {
        Business {
            id: 1,
            name: "Corner Cafe".into(),
            slug: "corner-cafe".into(),
            description: None,
            category_id: 1,
            sub_category_id: None,
            owner_id,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            latitude: None,
            longitude: None,
            phone: None,
            email: None,
            website: None,
            is_active,
            is_verified: is_active,
            is_public,
            is_featured: false,
            rejection_reason: None,
            rejected_at: None,
            approved_at: None,
            resubmitted_at: None,
            claimed_at: None,
            rating_average: 0.0,
            rating_count: 0,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parse_role_maps_known_roles_and_defaults_the_rest() {
        assert_eq!(parse_role("admin"), UserRole::Admin);
        assert_eq!(parse_role(" business_owner "), UserRole::BusinessOwner);
        assert_eq!(parse_role("user"), UserRole::User);
        assert_eq!(parse_role("superuser"), UserRole::User);
        assert_eq!(parse_role(""), UserRole::User);
    }

    #[test]
    fn visibility_covers_public_owner_and_admin() {
        let hidden = business(Some(5), false, false);
        let public = business(Some(5), true, true);

        let owner = Viewer {
            id: 5,
            role: UserRole::BusinessOwner,
        };
        let stranger = Viewer {
            id: 6,
            role: UserRole::User,
        };
        let admin = Viewer {
            id: 7,
            role: UserRole::Admin,
        };

        assert!(business_visible_to(&public, None));
        assert!(!business_visible_to(&hidden, None));
        assert!(business_visible_to(&hidden, Some(&owner)));
        assert!(!business_visible_to(&hidden, Some(&stranger)));
        assert!(business_visible_to(&hidden, Some(&admin)));
    }

    #[test]
    fn only_owner_or_admin_manages_a_listing() {
        let listing = business(Some(5), true, true);
        let unowned = business(None, true, true);

        let owner = Viewer {
            id: 5,
            role: UserRole::BusinessOwner,
        };
        let stranger = Viewer {
            id: 6,
            role: UserRole::User,
        };
        let admin = Viewer {
            id: 7,
            role: UserRole::Admin,
        };

        assert!(can_manage(&owner, &listing));
        assert!(!can_manage(&stranger, &listing));
        assert!(can_manage(&admin, &listing));
        assert!(!can_manage(&owner, &unowned));
    }

    #[test]
    fn losing_a_claim_race_reads_as_already_owned() {
        assert!(settle_claim(Some(business(Some(5), false, true))).is_ok());

        match settle_claim(None) {
            Err(err) => {
                assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
                assert_eq!(err.to_string(), "Business already has an owner");
            }
            Ok(_) => panic!("a missed claim guard must not yield a listing"),
        }
    }

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn duplicate_key_errors_are_recognized() {
        let duplicate = sqlx::Error::Database(Box::new(DuplicateKey));
        assert!(is_unique_violation(&duplicate));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[actix_rt::test]
    async fn extract_viewer_reads_actor_headers() {
        let req = actix_test::TestRequest::default()
            .insert_header(("X-Actor-Id", "42"))
            .insert_header(("X-Actor-Role", "admin"))
            .to_http_request();

        let viewer = extract_viewer(&req);
        assert_eq!(
            viewer,
            Some(Viewer {
                id: 42,
                role: UserRole::Admin
            })
        );
    }

    #[actix_rt::test]
    async fn extract_viewer_without_id_is_anonymous() {
        let req = actix_test::TestRequest::default()
            .insert_header(("X-Actor-Role", "admin"))
            .to_http_request();

        assert_eq!(extract_viewer(&req), None);
    }

    #[actix_rt::test]
    async fn extract_viewer_with_garbage_id_is_anonymous() {
        let req = actix_test::TestRequest::default()
            .insert_header(("X-Actor-Id", "not-a-number"))
            .to_http_request();

        assert_eq!(extract_viewer(&req), None);
    }

    #[actix_rt::test]
    async fn health_check_reports_ok() {
        let app = actix_test::init_service(App::new().service(health_check)).await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = actix_test::read_body(resp).await;
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        assert!(body_str.contains("\"status\":\"ok\""));
        assert!(body_str.contains("directory-service"));
    }

    #[actix_rt::test]
    async fn claim_without_actor_headers_is_unauthorized() {
        let db = Database::connect_lazy("postgres://localhost/unused").expect("lazy pool");
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(claim_business),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/businesses/5/claim")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);

        let body = actix_test::read_body(resp).await;
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        assert!(body_str.contains("\"success\":false"));
        assert!(body_str.contains("Authentication required"));
    }

    #[actix_rt::test]
    async fn pending_queue_rejects_non_admin_actors() {
        let db = Database::connect_lazy("postgres://localhost/unused").expect("lazy pool");
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(pending_businesses),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/admin/businesses/pending")
            .insert_header(("X-Actor-Id", "7"))
            .insert_header(("X-Actor-Role", "business_owner"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 403);

        let body = actix_test::read_body(resp).await;
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        assert!(body_str.contains("Administrator access required"));
    }
}
