use std::{borrow::Cow, time::Duration};

use futures_util::future::try_join;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgPool, Row,
};

use crate::models::{
    Business, CategorySummary, DirectoryStats, NewBusiness, NewReview, Review, SubCategorySummary,
    User,
};
use crate::moderation::{Approval, Claim, Rejection, Resubmission};
use crate::search::{self, Filter, Page, Sort, SqlArg};
use crate::slug;

/// Column list shared by every business query so RETURNING/SELECT stay in
/// sync with the `Business` struct.
const BUSINESS_COLUMNS: &str = "id, name, slug, description, category_id, sub_category_id, \
    owner_id, address, city, state, zip_code, country, latitude, longitude, phone, email, \
    website, is_active, is_verified, is_public, is_featured, rejection_reason, rejected_at, \
    approved_at, resubmitted_at, claimed_at, rating_average, rating_count, views, created_at, \
    updated_at";

/// Column list shared by every review query.
const REVIEW_COLUMNS: &str = "id, business_id, user_id, rating, title, comment, is_approved, \
    helpful_count, response_comment, responded_at, responded_by, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = match PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600)))
            .test_before_acquire(true)
            .connect(database_url)
            .await
        {
            Ok(pool) => pool,
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("3D000")) => {
                log::info!("Database missing, attempting to create it");
                create_database_if_missing(database_url).await?;

                PgPoolOptions::new()
                    .max_connections(10)
                    .min_connections(2)
                    .acquire_timeout(Duration::from_secs(5))
                    .idle_timeout(Some(Duration::from_secs(600)))
                    .test_before_acquire(true)
                    .connect(database_url)
                    .await?
            }
            Err(err) => return Err(err),
        };

        // Run embedded migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Pool that only connects on first use; unit tests exercising routing
    /// and guard paths never reach the database.
    #[cfg(test)]
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Insert a new listing in the pending state. When the submitter is a
    /// known user, their role is promoted to business_owner in the same
    /// transaction (admins keep their role).
    pub async fn insert_business(&self, business: NewBusiness) -> Result<Business, sqlx::Error> {
        let NewBusiness {
            name,
            slug,
            description,
            category_id,
            sub_category_id,
            owner_id,
            address,
            city,
            state,
            zip_code,
            country,
            latitude,
            longitude,
            phone,
            email,
            website,
            is_public,
        } = business;

        let mut tx = self.pool.begin().await?;

        let record = {
            let conn = tx.as_mut();
            let sql = format!(
                "INSERT INTO businesses (
                    name, slug, description, category_id, sub_category_id, owner_id,
                    address, city, state, zip_code, country, latitude, longitude,
                    phone, email, website, is_public
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                RETURNING {BUSINESS_COLUMNS}"
            );
            sqlx::query_as::<_, Business>(&sql)
                .bind(name)
                .bind(slug)
                .bind(description)
                .bind(category_id)
                .bind(sub_category_id)
                .bind(owner_id)
                .bind(address)
                .bind(city)
                .bind(state)
                .bind(zip_code)
                .bind(country)
                .bind(latitude)
                .bind(longitude)
                .bind(phone)
                .bind(email)
                .bind(website)
                .bind(is_public)
                .fetch_one(conn)
                .await?
        };

        if let Some(owner_id) = record.owner_id {
            let conn = tx.as_mut();
            sqlx::query(
                "UPDATE users SET role = 'business_owner', updated_at = NOW()
                 WHERE id = $1 AND role <> 'admin'",
            )
            .bind(owner_id)
            .execute(conn)
            .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    pub async fn get_business(&self, business_id: i64) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1");
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn get_business_by_slug(&self, slug: &str) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE slug = $1");
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Bump the view counter and return the refreshed row.
    pub async fn record_view(&self, business_id: i64) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!(
            "UPDATE businesses SET views = views + 1 WHERE id = $1 RETURNING {BUSINESS_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Persist the editable fields of a listing. Moderation flags and
    /// aggregates are written by their own targeted updates.
    pub async fn update_business(&self, business: Business) -> Result<Business, sqlx::Error> {
        let Business {
            id,
            name,
            slug,
            description,
            category_id,
            sub_category_id,
            address,
            city,
            state,
            zip_code,
            country,
            latitude,
            longitude,
            phone,
            email,
            website,
            is_public,
            ..
        } = business;

        let sql = format!(
            "UPDATE businesses
             SET name = $2, slug = $3, description = $4, category_id = $5,
                 sub_category_id = $6, address = $7, city = $8, state = $9,
                 zip_code = $10, country = $11, latitude = $12, longitude = $13,
                 phone = $14, email = $15, website = $16, is_public = $17,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(category_id)
            .bind(sub_category_id)
            .bind(address)
            .bind(city)
            .bind(state)
            .bind(zip_code)
            .bind(country)
            .bind(latitude)
            .bind(longitude)
            .bind(phone)
            .bind(email)
            .bind(website)
            .bind(is_public)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn delete_business(&self, business_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, sqlx::Error> {
        let record = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(
                SELECT 1 FROM businesses
                WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.0)
    }

    /// Derive a slug for `name` that no other listing uses. Collisions get
    /// a millisecond-timestamp suffix instead of failing the write.
    pub async fn unique_slug(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, sqlx::Error> {
        let base = slug::slugify(name);
        if self.slug_exists(&base, exclude_id).await? {
            Ok(slug::with_timestamp_suffix(&base))
        } else {
            Ok(base)
        }
    }

    /// Run a composed search: fetch one page of rows and the total count
    /// concurrently.
    pub async fn search_businesses(
        &self,
        filter: &Filter,
        sort: Sort,
        page: Page,
    ) -> Result<(Vec<Business>, i64), sqlx::Error> {
        let (where_sql, args) = search::lower(filter);

        let mut rows_args = args.clone();
        rows_args.push(SqlArg::Int(page.limit));
        rows_args.push(SqlArg::Int(page.offset()));

        let rows_sql = format!(
            "SELECT {} FROM businesses WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            BUSINESS_COLUMNS,
            where_sql,
            sort.order_by(),
            args.len() + 1,
            args.len() + 2,
        );
        let count_sql = format!("SELECT COUNT(*) FROM businesses WHERE {}", where_sql);

        let rows = bind_args(sqlx::query_as::<_, Business>(&rows_sql), &rows_args)
            .fetch_all(&self.pool);
        let total = bind_args(sqlx::query_as::<_, (i64,)>(&count_sql), &args)
            .fetch_one(&self.pool);

        let (businesses, (total,)) = try_join(rows, total).await?;

        Ok((businesses, total))
    }

    /// Moderation queue: pending listings, oldest submissions first.
    pub async fn list_pending_businesses(
        &self,
        page: Page,
    ) -> Result<(Vec<Business>, i64), sqlx::Error> {
        let rows_sql = format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses
             WHERE is_active = FALSE AND rejection_reason IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Business>(&rows_sql)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool);
        let total = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM businesses WHERE is_active = FALSE AND rejection_reason IS NULL",
        )
        .fetch_one(&self.pool);

        let (businesses, (total,)) = try_join(rows, total).await?;

        Ok((businesses, total))
    }

    pub async fn directory_stats(&self) -> Result<DirectoryStats, sqlx::Error> {
        let record = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_active = FALSE AND rejection_reason IS NULL) AS pending,
                COUNT(*) FILTER (WHERE is_active = TRUE) AS active,
                COUNT(*) FILTER (WHERE is_active = FALSE AND rejection_reason IS NOT NULL) AS rejected,
                COUNT(*) FILTER (WHERE approved_at >= CURRENT_DATE) AS approved_today,
                COUNT(*) FILTER (WHERE rejected_at >= CURRENT_DATE) AS rejected_today
            FROM businesses
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DirectoryStats {
            pending: record.try_get::<i64, _>("pending")?,
            active: record.try_get::<i64, _>("active")?,
            rejected: record.try_get::<i64, _>("rejected")?,
            approved_today: record.try_get::<i64, _>("approved_today")?,
            rejected_today: record.try_get::<i64, _>("rejected_today")?,
        })
    }

    pub async fn apply_approval(
        &self,
        business_id: i64,
        approval: &Approval,
    ) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!(
            "UPDATE businesses
             SET is_active = TRUE, is_verified = TRUE, approved_at = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .bind(approval.approved_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn apply_rejection(
        &self,
        business_id: i64,
        rejection: &Rejection,
    ) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!(
            "UPDATE businesses
             SET is_active = FALSE, rejection_reason = $2, rejected_at = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .bind(&rejection.reason)
            .bind(rejection.rejected_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn apply_resubmission(
        &self,
        business_id: i64,
        resubmission: &Resubmission,
    ) -> Result<Option<Business>, sqlx::Error> {
        let sql = format!(
            "UPDATE businesses
             SET is_active = FALSE, rejection_reason = NULL, rejected_at = NULL,
                 resubmitted_at = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .bind(resubmission.resubmitted_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Assign ownership of an unowned listing and force it back to pending.
    /// The claimant's role is promoted in the same transaction; the WHERE
    /// guard keeps two concurrent claims from both succeeding.
    pub async fn apply_claim(
        &self,
        business_id: i64,
        claim: &Claim,
    ) -> Result<Option<Business>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let record = {
            let conn = tx.as_mut();
            let sql = format!(
                "UPDATE businesses
                 SET owner_id = $2, claimed_at = $3, is_active = FALSE, updated_at = NOW()
                 WHERE id = $1 AND owner_id IS NULL
                 RETURNING {BUSINESS_COLUMNS}"
            );
            sqlx::query_as::<_, Business>(&sql)
                .bind(business_id)
                .bind(claim.owner_id)
                .bind(claim.claimed_at)
                .fetch_optional(conn)
                .await?
        };

        if record.is_some() {
            let conn = tx.as_mut();
            sqlx::query(
                "UPDATE users SET role = 'business_owner', updated_at = NOW()
                 WHERE id = $1 AND role <> 'admin'",
            )
            .bind(claim.owner_id)
            .execute(conn)
            .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    pub async fn insert_review(&self, review: NewReview) -> Result<Review, sqlx::Error> {
        let NewReview {
            business_id,
            user_id,
            rating,
            title,
            comment,
        } = review;

        let sql = format!(
            "INSERT INTO reviews (business_id, user_id, rating, title, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REVIEW_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(business_id)
            .bind(user_id)
            .bind(rating)
            .bind(title)
            .bind(comment)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn get_review(&self, review_id: i64) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// One review per user per business: look up the existing row, if any.
    pub async fn get_review_by_author(
        &self,
        business_id: i64,
        user_id: i64,
    ) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE business_id = $1 AND user_id = $2"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(business_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Approved reviews for one business, newest first.
    pub async fn list_reviews(
        &self,
        business_id: i64,
        page: Page,
    ) -> Result<(Vec<Review>, i64), sqlx::Error> {
        let rows_sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE business_id = $1 AND is_approved = TRUE
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Review>(&rows_sql)
            .bind(business_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool);
        let total = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM reviews WHERE business_id = $1 AND is_approved = TRUE",
        )
        .bind(business_id)
        .fetch_one(&self.pool);

        let (reviews, (total,)) = try_join(rows, total).await?;

        Ok((reviews, total))
    }

    pub async fn update_review(&self, review: Review) -> Result<Review, sqlx::Error> {
        let sql = format!(
            "UPDATE reviews
             SET rating = $2, title = $3, comment = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(review.id)
            .bind(review.rating)
            .bind(review.title)
            .bind(review.comment)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn delete_review(&self, review_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    pub async fn increment_helpful(&self, review_id: i64) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!(
            "UPDATE reviews SET helpful_count = helpful_count + 1, updated_at = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn set_review_response(
        &self,
        review_id: i64,
        response_comment: &str,
        responder_id: i64,
    ) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!(
            "UPDATE reviews
             SET response_comment = $2, responded_at = NOW(), responded_by = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .bind(response_comment)
            .bind(responder_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn set_review_approval(
        &self,
        review_id: i64,
        is_approved: bool,
    ) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!(
            "UPDATE reviews SET is_approved = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .bind(is_approved)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Recompute a listing's rating aggregate from its approved reviews.
    ///
    /// A single statement computes and writes the aggregate so concurrent
    /// review writes cannot interleave a stale read-modify-write. With no
    /// approved reviews both fields drop to 0.
    pub async fn recompute_business_rating(&self, business_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE businesses
            SET rating_average = COALESCE(agg.avg_rating, 0),
                rating_count = COALESCE(agg.review_count, 0),
                updated_at = NOW()
            FROM (
                SELECT
                    ROUND(AVG(rating)::numeric, 2)::DOUBLE PRECISION AS avg_rating,
                    COUNT(*) AS review_count
                FROM reviews
                WHERE business_id = $1 AND is_approved = TRUE
            ) AS agg
            WHERE businesses.id = $1
            "#,
        )
        .bind(business_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Active categories with their live listing counts. Counts only cover
    /// publicly visible businesses and are derived per request, never stored.
    pub async fn list_categories(&self) -> Result<Vec<CategorySummary>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT
                c.id,
                c.name,
                c.slug,
                c.icon,
                c.sort_order,
                (SELECT COUNT(*)
                   FROM businesses b
                  WHERE b.category_id = c.id
                    AND b.is_active = TRUE
                    AND b.is_public = TRUE) AS business_count
            FROM categories c
            WHERE c.is_active = TRUE
            ORDER BY c.sort_order ASC, c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_subcategories(
        &self,
        category_id: i64,
    ) -> Result<Vec<SubCategorySummary>, sqlx::Error> {
        let records = sqlx::query_as::<_, SubCategorySummary>(
            r#"
            SELECT
                s.id,
                s.category_id,
                s.name,
                s.slug,
                s.icon,
                s.sort_order,
                (SELECT COUNT(*)
                   FROM businesses b
                  WHERE b.sub_category_id = s.id
                    AND b.is_active = TRUE
                    AND b.is_public = TRUE) AS business_count
            FROM subcategories s
            WHERE s.category_id = $1 AND s.is_active = TRUE
            ORDER BY s.sort_order ASC, s.name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn category_exists(&self, category_id: i64) -> Result<bool, sqlx::Error> {
        let record =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(record.0)
    }

    pub async fn subcategory_in_category(
        &self,
        sub_category_id: i64,
        category_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let record = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM subcategories WHERE id = $1 AND category_id = $2)",
        )
        .bind(sub_category_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.0)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        let record = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

/// Apply lowered filter arguments to a query in placeholder order.
fn bind_args<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    args: &'q [SqlArg],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    let mut query = query;
    for arg in args {
        query = match arg {
            SqlArg::Text(value) => query.bind(value),
            SqlArg::Int(value) => query.bind(value),
            SqlArg::Float(value) => query.bind(value),
            SqlArg::IntList(values) => query.bind(values),
            SqlArg::TextList(values) => query.bind(values),
        };
    }
    query
}

async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    let database_name = options
        .get_database()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "postgres".to_string());

    // If we're already targeting the default maintenance database, nothing to do.
    if database_name.eq_ignore_ascii_case("postgres") {
        return Ok(());
    }

    let maintenance_options = options.clone().database("postgres");

    let mut connection = sqlx::postgres::PgConnection::connect_with(&maintenance_options).await?;

    let escaped_name = database_name.replace('"', "\"\"");
    let create_stmt = format!("CREATE DATABASE \"{}\"", escaped_name);

    match connection.execute(create_stmt.as_str()).await {
        Ok(_) => {
            log::info!("Created database '{}'", database_name);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("42P04")) => {
            log::info!("Database '{}' already exists", database_name);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
