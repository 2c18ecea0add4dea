//! Business search: filter composition, ranking and pagination.
//!
//! The search surface accepts a flat bag of optional query parameters plus a
//! viewer context and turns them into a predicate tree that the database
//! layer lowers onto SQL. Everything here is pure and side-effect free:
//! malformed values are dropped rather than rejected (a bad filter must
//! never fail a search), and both composition and lowering are unit-testable
//! without a database.

use serde::Deserialize;

use crate::models::{UserRole, Viewer};

/// Hard ceiling on page size, shared by every list endpoint.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Raw search parameters as they arrive on the query string.
///
/// Every field is an optional string. Parsing is deliberately deferred to
/// [`compose_filter`] so that garbage input degrades to "filter ignored"
/// instead of a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub categories: Option<String>,
    pub sub_category: Option<String>,
    pub sub_categories: Option<String>,
    pub city: Option<String>,
    pub cities: Option<String>,
    pub state: Option<String>,
    pub states: Option<String>,
    pub zip_code: Option<String>,
    pub ratings: Option<String>,
    pub min_rating: Option<String>,
    pub featured: Option<String>,
    pub owner_id: Option<String>,
    pub public_only: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Business columns the search surface may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Description,
    City,
    State,
    ZipCode,
    CategoryId,
    SubCategoryId,
    OwnerId,
    RatingAverage,
    IsActive,
    IsPublic,
    IsFeatured,
}

impl Column {
    fn as_sql(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Description => "description",
            Column::City => "city",
            Column::State => "state",
            Column::ZipCode => "zip_code",
            Column::CategoryId => "category_id",
            Column::SubCategoryId => "sub_category_id",
            Column::OwnerId => "owner_id",
            Column::RatingAverage => "rating_average",
            Column::IsActive => "is_active",
            Column::IsPublic => "is_public",
            Column::IsFeatured => "is_featured",
        }
    }
}

/// Predicate tree over business rows.
///
/// Leaves compare a single column; `And`/`Or` combine subtrees. [`lower`]
/// turns the tree into a parameterized SQL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Case-insensitive substring match.
    Contains(Column, String),
    EqText(Column, String),
    EqInt(Column, i64),
    /// Membership in an id set.
    AnyInt(Column, Vec<i64>),
    /// Membership in a text set, matched exactly.
    AnyText(Column, Vec<String>),
    /// `column >= threshold`.
    AtLeast(Column, f64),
    IsTrue(Column),
}

/// A bind argument produced while lowering a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
    Float(f64),
    IntList(Vec<i64>),
    TextList(Vec<String>),
}

/// Build the search predicate for one request.
///
/// Independent filter axes are ANDed together; values within one axis form
/// an OR/IN group. The visibility overlay lands last: anonymous callers and
/// plain users only see `is_active AND is_public` rows, a business owner or
/// admin browsing generally also sees their own rows, and an explicit
/// `ownerId` filter suppresses the overlay entirely unless `publicOnly`
/// asks for it back.
pub fn compose_filter(query: &SearchQuery, viewer: Option<&Viewer>) -> Filter {
    let mut axes = Vec::new();

    if let Some(term) = trimmed(&query.search) {
        axes.push(Filter::Or(vec![
            Filter::Contains(Column::Name, term.to_string()),
            Filter::Contains(Column::Description, term.to_string()),
        ]));
    }

    if let Some(location) = trimmed(&query.location) {
        if let Some(filter) = location_filter(location) {
            axes.push(filter);
        }
    }

    let category_ids = parse_id_list(&[&query.category, &query.categories]);
    if !category_ids.is_empty() {
        axes.push(membership_int(Column::CategoryId, category_ids));
    }

    let sub_category_ids = parse_id_list(&[&query.sub_category, &query.sub_categories]);
    if !sub_category_ids.is_empty() {
        axes.push(membership_int(Column::SubCategoryId, sub_category_ids));
    }

    let cities = parse_text_list(&[&query.city, &query.cities]);
    if !cities.is_empty() {
        axes.push(contains_any(Column::City, cities));
    }

    let states = parse_text_list(&[&query.state, &query.states]);
    if !states.is_empty() {
        axes.push(membership_text(Column::State, states));
    }

    let zip_codes = parse_text_list(&[&query.zip_code]);
    if !zip_codes.is_empty() {
        axes.push(membership_text(Column::ZipCode, zip_codes));
    }

    if let Some(threshold) = rating_threshold(&query.ratings, &query.min_rating) {
        axes.push(Filter::AtLeast(Column::RatingAverage, threshold));
    }

    if parse_bool(&query.featured) == Some(true) {
        axes.push(Filter::IsTrue(Column::IsFeatured));
    }

    let owner_filter = query.owner_id.as_deref().and_then(parse_i64);
    let public_only = parse_bool(&query.public_only) == Some(true);

    match owner_filter {
        Some(owner_id) => {
            axes.push(Filter::EqInt(Column::OwnerId, owner_id));
            if public_only {
                axes.push(public_overlay());
            }
        }
        None => match viewer {
            Some(viewer)
                if !public_only
                    && matches!(viewer.role, UserRole::BusinessOwner | UserRole::Admin) =>
            {
                axes.push(Filter::Or(vec![
                    Filter::EqInt(Column::OwnerId, viewer.id),
                    public_overlay(),
                ]));
            }
            _ => axes.push(public_overlay()),
        },
    }

    Filter::And(axes)
}

fn public_overlay() -> Filter {
    Filter::And(vec![
        Filter::IsTrue(Column::IsActive),
        Filter::IsTrue(Column::IsPublic),
    ])
}

/// Parse the free-text `location` parameter.
///
/// "Detroit, MI" must match city+state together, but also city-only and
/// state-only hits. Everything after the first comma counts as the state
/// part so multi-word states survive the split.
fn location_filter(location: &str) -> Option<Filter> {
    if let Some((city_part, state_part)) = location.split_once(',') {
        let city_part = city_part.trim();
        let state_part = state_part.trim();
        return match (city_part.is_empty(), state_part.is_empty()) {
            (false, false) => Some(Filter::Or(vec![
                Filter::And(vec![
                    Filter::Contains(Column::City, city_part.to_string()),
                    Filter::Contains(Column::State, state_part.to_string()),
                ]),
                Filter::Contains(Column::City, city_part.to_string()),
                Filter::Contains(Column::State, state_part.to_string()),
            ])),
            (false, true) => Some(city_or_state(city_part)),
            (true, false) => Some(city_or_state(state_part)),
            (true, true) => None,
        };
    }
    Some(city_or_state(location))
}

fn city_or_state(text: &str) -> Filter {
    Filter::Or(vec![
        Filter::Contains(Column::City, text.to_string()),
        Filter::Contains(Column::State, text.to_string()),
    ])
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_i64(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn parse_bool(value: &Option<String>) -> Option<bool> {
    match value.as_deref().map(str::trim) {
        Some("true") | Some("1") => Some(true),
        Some("false") | Some("0") => Some(false),
        _ => None,
    }
}

/// Collect numeric ids from comma-separated sources, dropping anything that
/// does not parse and deduplicating while preserving first-seen order.
fn parse_id_list(sources: &[&Option<String>]) -> Vec<i64> {
    let mut ids = Vec::new();
    for source in sources {
        if let Some(raw) = source.as_deref() {
            for part in raw.split(',') {
                if let Ok(id) = part.trim().parse::<i64>() {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
    }
    ids
}

fn parse_text_list(sources: &[&Option<String>]) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for source in sources {
        if let Some(raw) = source.as_deref() {
            for part in raw.split(',') {
                let part = part.trim();
                if !part.is_empty() && !values.iter().any(|v| v == part) {
                    values.push(part.to_string());
                }
            }
        }
    }
    values
}

/// Effective minimum-rating threshold. Selecting {3,5} means "3 stars and
/// up": the least restrictive selection wins. `min_rating` is the legacy
/// single-value spelling and folds into the same pool.
fn rating_threshold(ratings: &Option<String>, min_rating: &Option<String>) -> Option<f64> {
    let mut thresholds: Vec<f64> = Vec::new();
    for source in [ratings, min_rating] {
        if let Some(raw) = source.as_deref() {
            for part in raw.split(',') {
                if let Ok(value) = part.trim().parse::<f64>() {
                    if value.is_finite() {
                        thresholds.push(value);
                    }
                }
            }
        }
    }
    thresholds.into_iter().reduce(f64::min)
}

fn membership_int(column: Column, ids: Vec<i64>) -> Filter {
    if ids.len() == 1 {
        Filter::EqInt(column, ids[0])
    } else {
        Filter::AnyInt(column, ids)
    }
}

fn membership_text(column: Column, mut values: Vec<String>) -> Filter {
    if values.len() == 1 {
        Filter::EqText(column, values.remove(0))
    } else {
        Filter::AnyText(column, values)
    }
}

fn contains_any(column: Column, values: Vec<String>) -> Filter {
    let mut branches: Vec<Filter> = values
        .into_iter()
        .map(|value| Filter::Contains(column, value))
        .collect();
    if branches.len() == 1 {
        branches.remove(0)
    } else {
        Filter::Or(branches)
    }
}

/// Lower a filter tree to a SQL fragment plus its ordered bind arguments.
///
/// Placeholders are numbered from `$1`; callers appending LIMIT/OFFSET
/// binds continue from `args.len() + 1`.
pub fn lower(filter: &Filter) -> (String, Vec<SqlArg>) {
    let mut args = Vec::new();
    let sql = lower_node(filter, &mut args);
    (sql, args)
}

fn lower_node(filter: &Filter, args: &mut Vec<SqlArg>) -> String {
    match filter {
        Filter::And(children) => lower_group(children, " AND ", args),
        Filter::Or(children) => lower_group(children, " OR ", args),
        Filter::Contains(column, needle) => {
            args.push(SqlArg::Text(like_pattern(needle)));
            format!("{} ILIKE ${}", column.as_sql(), args.len())
        }
        Filter::EqText(column, value) => {
            args.push(SqlArg::Text(value.clone()));
            format!("{} = ${}", column.as_sql(), args.len())
        }
        Filter::EqInt(column, value) => {
            args.push(SqlArg::Int(*value));
            format!("{} = ${}", column.as_sql(), args.len())
        }
        Filter::AnyInt(column, values) => {
            args.push(SqlArg::IntList(values.clone()));
            format!("{} = ANY(${})", column.as_sql(), args.len())
        }
        Filter::AnyText(column, values) => {
            args.push(SqlArg::TextList(values.clone()));
            format!("{} = ANY(${})", column.as_sql(), args.len())
        }
        Filter::AtLeast(column, threshold) => {
            args.push(SqlArg::Float(*threshold));
            format!("{} >= ${}", column.as_sql(), args.len())
        }
        Filter::IsTrue(column) => format!("{} = TRUE", column.as_sql()),
    }
}

fn lower_group(children: &[Filter], joiner: &str, args: &mut Vec<SqlArg>) -> String {
    if children.is_empty() {
        return "TRUE".to_string();
    }
    let parts: Vec<String> = children
        .iter()
        .map(|child| lower_node(child, args))
        .collect();
    if parts.len() == 1 {
        parts.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", parts.join(joiner))
    }
}

/// Escape LIKE metacharacters in user input and wrap it for substring match.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Sort directives supported by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Rating,
    Name,
    Views,
    Newest,
    Oldest,
}

impl Sort {
    /// Map the raw `sort` value; unrecognized or absent values fall back to
    /// the rating ordering.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Sort::Name,
            Some("views") => Sort::Views,
            Some("newest") => Sort::Newest,
            Some("oldest") => Sort::Oldest,
            _ => Sort::Rating,
        }
    }

    /// Full ORDER BY chain. Every chain ends on `id` so the ordering stays
    /// total even when the leading columns tie.
    pub fn order_by(self) -> &'static str {
        match self {
            Sort::Rating => {
                "is_featured DESC, rating_average DESC, rating_count DESC, created_at DESC, id DESC"
            }
            Sort::Name => "name ASC, id ASC",
            Sort::Views => "views DESC, id DESC",
            Sort::Newest => "created_at DESC, id DESC",
            Sort::Oldest => "created_at ASC, id ASC",
        }
    }
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Resolve raw page/limit values. Non-numeric, zero or negative input
    /// falls back to the defaults rather than failing the request; limits
    /// are clamped to [`MAX_PAGE_LIMIT`].
    pub fn from_params(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        let page = page
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_LIMIT);
        Page { page, limit }
    }

    pub fn offset(self) -> i64 {
        // Saturate so an absurd page number degrades to an empty page
        // instead of a negative OFFSET.
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Total page count for a result set: `ceil(total / limit)`.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SearchQuery {
        SearchQuery::default()
    }

    fn viewer(id: i64, role: UserRole) -> Viewer {
        Viewer { id, role }
    }

    fn overlay() -> Filter {
        Filter::And(vec![
            Filter::IsTrue(Column::IsActive),
            Filter::IsTrue(Column::IsPublic),
        ])
    }

    #[test]
    fn free_text_matches_name_or_description() {
        let filter = compose_filter(
            &SearchQuery {
                search: Some("  pizza ".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::Or(vec![
                    Filter::Contains(Column::Name, "pizza".into()),
                    Filter::Contains(Column::Description, "pizza".into()),
                ]),
                overlay(),
            ])
        );
    }

    #[test]
    fn location_with_comma_matches_pair_city_and_state_branches() {
        let filter = compose_filter(
            &SearchQuery {
                location: Some("Detroit, MI".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::Or(vec![
                    Filter::And(vec![
                        Filter::Contains(Column::City, "Detroit".into()),
                        Filter::Contains(Column::State, "MI".into()),
                    ]),
                    Filter::Contains(Column::City, "Detroit".into()),
                    Filter::Contains(Column::State, "MI".into()),
                ]),
                overlay(),
            ])
        );
    }

    #[test]
    fn location_keeps_multiword_state_after_first_comma() {
        let filter = compose_filter(
            &SearchQuery {
                location: Some("Las Cruces, New, Mexico".into()),
                ..query()
            },
            None,
        );
        let Filter::And(axes) = &filter else {
            panic!("expected top-level AND");
        };
        let Filter::Or(branches) = &axes[0] else {
            panic!("expected location OR group");
        };
        assert_eq!(
            branches[2],
            Filter::Contains(Column::State, "New, Mexico".into())
        );
    }

    #[test]
    fn location_without_comma_tries_city_and_state() {
        let filter = compose_filter(
            &SearchQuery {
                location: Some("Detroit".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::Or(vec![
                    Filter::Contains(Column::City, "Detroit".into()),
                    Filter::Contains(Column::State, "Detroit".into()),
                ]),
                overlay(),
            ])
        );
    }

    #[test]
    fn location_of_bare_commas_is_ignored() {
        let filter = compose_filter(
            &SearchQuery {
                location: Some(" , ".into()),
                ..query()
            },
            None,
        );
        assert_eq!(filter, Filter::And(vec![overlay()]));
    }

    #[test]
    fn category_ids_merge_across_both_spellings_and_drop_garbage() {
        let filter = compose_filter(
            &SearchQuery {
                category: Some("2".into()),
                categories: Some("9, bogus, 2, 11".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::AnyInt(Column::CategoryId, vec![2, 9, 11]),
                overlay(),
            ])
        );
    }

    #[test]
    fn single_category_uses_equality_not_membership() {
        let filter = compose_filter(
            &SearchQuery {
                category: Some("4".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![Filter::EqInt(Column::CategoryId, 4), overlay()])
        );
    }

    #[test]
    fn cities_match_by_substring_states_match_exactly() {
        let filter = compose_filter(
            &SearchQuery {
                cities: Some("Ann Arbor,Ypsilanti".into()),
                states: Some("MI,OH".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::Or(vec![
                    Filter::Contains(Column::City, "Ann Arbor".into()),
                    Filter::Contains(Column::City, "Ypsilanti".into()),
                ]),
                Filter::AnyText(Column::State, vec!["MI".into(), "OH".into()]),
                overlay(),
            ])
        );
    }

    #[test]
    fn minimum_rating_wins_across_selections() {
        let combined = compose_filter(
            &SearchQuery {
                ratings: Some("3,5".into()),
                ..query()
            },
            None,
        );
        let single = compose_filter(
            &SearchQuery {
                ratings: Some("3".into()),
                ..query()
            },
            None,
        );
        assert_eq!(combined, single);
    }

    #[test]
    fn legacy_min_rating_folds_into_the_threshold_pool() {
        let filter = compose_filter(
            &SearchQuery {
                ratings: Some("4".into()),
                min_rating: Some("2".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::AtLeast(Column::RatingAverage, 2.0),
                overlay(),
            ])
        );
    }

    #[test]
    fn unparsable_rating_and_featured_values_are_dropped() {
        let filter = compose_filter(
            &SearchQuery {
                ratings: Some("lots".into()),
                featured: Some("bananas".into()),
                ..query()
            },
            None,
        );
        assert_eq!(filter, Filter::And(vec![overlay()]));
    }

    #[test]
    fn featured_true_restricts_to_featured_rows() {
        let filter = compose_filter(
            &SearchQuery {
                featured: Some("true".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![Filter::IsTrue(Column::IsFeatured), overlay()])
        );
    }

    #[test]
    fn anonymous_viewer_gets_the_public_overlay() {
        let filter = compose_filter(&query(), None);
        assert_eq!(filter, Filter::And(vec![overlay()]));
    }

    #[test]
    fn plain_user_role_is_treated_like_anonymous() {
        let filter = compose_filter(&query(), Some(&viewer(5, UserRole::User)));
        assert_eq!(filter, Filter::And(vec![overlay()]));
    }

    #[test]
    fn business_owner_browsing_also_sees_their_own_rows() {
        let filter = compose_filter(&query(), Some(&viewer(5, UserRole::BusinessOwner)));
        assert_eq!(
            filter,
            Filter::And(vec![Filter::Or(vec![
                Filter::EqInt(Column::OwnerId, 5),
                overlay(),
            ])])
        );
    }

    #[test]
    fn admin_with_public_only_browses_the_public_view() {
        let filter = compose_filter(
            &SearchQuery {
                public_only: Some("true".into()),
                ..query()
            },
            Some(&viewer(1, UserRole::Admin)),
        );
        assert_eq!(filter, Filter::And(vec![overlay()]));
    }

    #[test]
    fn owner_id_filter_suppresses_the_visibility_overlay() {
        let filter = compose_filter(
            &SearchQuery {
                owner_id: Some("12".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![Filter::EqInt(Column::OwnerId, 12)])
        );
    }

    #[test]
    fn owner_id_with_public_only_reapplies_the_overlay() {
        let filter = compose_filter(
            &SearchQuery {
                owner_id: Some("12".into()),
                public_only: Some("true".into()),
                ..query()
            },
            None,
        );
        assert_eq!(
            filter,
            Filter::And(vec![Filter::EqInt(Column::OwnerId, 12), overlay()])
        );
    }

    #[test]
    fn lowering_numbers_placeholders_sequentially() {
        let filter = compose_filter(
            &SearchQuery {
                search: Some("pizza".into()),
                categories: Some("2,9".into()),
                ..query()
            },
            None,
        );
        let (sql, args) = lower(&filter);
        assert_eq!(
            sql,
            "((name ILIKE $1 OR description ILIKE $2) AND category_id = ANY($3) \
             AND (is_active = TRUE AND is_public = TRUE))"
        );
        assert_eq!(
            args,
            vec![
                SqlArg::Text("%pizza%".into()),
                SqlArg::Text("%pizza%".into()),
                SqlArg::IntList(vec![2, 9]),
            ]
        );
    }

    #[test]
    fn lowering_escapes_like_metacharacters() {
        let (sql, args) = lower(&Filter::Contains(Column::Name, "50%_off\\now".into()));
        assert_eq!(sql, "name ILIKE $1");
        assert_eq!(args, vec![SqlArg::Text("%50\\%\\_off\\\\now%".into())]);
    }

    #[test]
    fn lowering_an_empty_group_yields_true() {
        let (sql, args) = lower(&Filter::And(Vec::new()));
        assert_eq!(sql, "TRUE");
        assert!(args.is_empty());
    }

    #[test]
    fn sort_falls_back_to_rating_for_unknown_values() {
        assert_eq!(Sort::from_param(None), Sort::Rating);
        assert_eq!(Sort::from_param(Some("by_vibes")), Sort::Rating);
        assert_eq!(Sort::from_param(Some("oldest")), Sort::Oldest);
    }

    #[test]
    fn every_order_chain_ends_on_id() {
        for sort in [Sort::Rating, Sort::Name, Sort::Views, Sort::Newest, Sort::Oldest] {
            let chain = sort.order_by();
            assert!(
                chain.ends_with("id DESC") || chain.ends_with("id ASC"),
                "chain {chain:?} is not total"
            );
        }
    }

    #[test]
    fn rating_chain_leads_with_featured_then_average() {
        assert_eq!(
            Sort::Rating.order_by(),
            "is_featured DESC, rating_average DESC, rating_count DESC, created_at DESC, id DESC"
        );
    }

    #[test]
    fn page_defaults_and_garbage_fall_back() {
        assert_eq!(
            Page::from_params(None, None, 20),
            Page { page: 1, limit: 20 }
        );
        assert_eq!(
            Page::from_params(Some("abc"), Some("-5"), 20),
            Page { page: 1, limit: 20 }
        );
        assert_eq!(
            Page::from_params(Some("0"), Some("0"), 10),
            Page { page: 1, limit: 10 }
        );
    }

    #[test]
    fn page_limit_is_clamped() {
        assert_eq!(
            Page::from_params(Some("3"), Some("500"), 20),
            Page {
                page: 3,
                limit: MAX_PAGE_LIMIT
            }
        );
    }

    #[test]
    fn offset_reflects_one_based_pages() {
        assert_eq!(Page { page: 1, limit: 20 }.offset(), 0);
        assert_eq!(Page { page: 4, limit: 10 }.offset(), 30);
    }

    #[test]
    fn offset_saturates_for_extreme_pages() {
        let page = Page::from_params(Some("9223372036854775807"), Some("100"), 20);
        assert_eq!(page.offset(), i64::MAX);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(41, 20), 3);
        assert_eq!(page_count(40, 20), 2);
        assert_eq!(page_count(1, 20), 1);
    }
}
