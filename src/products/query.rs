//! Listing query assembly: filters, sorting and pagination for the product
//! catalogue. The WHERE clause is built from numbered placeholders so the
//! repository can bind values positionally; user input never reaches the SQL
//! text itself. Sort column and direction come from fixed allow-lists and
//! out-of-range values fall back to the defaults instead of erroring.

use crate::error::ApiError;
use crate::products::dto::{ListParams, Pagination};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Price,
    Stock,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// Resolve the `sort` parameter against the allow-list. Anything else,
    /// including an absent parameter, sorts by creation time.
    fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => Self::Name,
            Some("price") => Self::Price,
            Some("stock") => Self::Stock,
            Some("updated_at") => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Stock => "stock",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `asc` selects ascending order; everything
    /// else means descending.
    fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Escape LIKE metacharacters so a search term only ever matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// A fully resolved listing request: every parameter validated, clamped or
/// defaulted. Constructing one cannot produce SQL that depends on raw user
/// input.
#[derive(Debug)]
pub struct ProductListing {
    pattern: Option<String>,
    category_id: Option<i32>,
    page: i64,
    limit: i64,
    sort: SortColumn,
    order: SortOrder,
}

impl ProductListing {
    pub fn from_params(params: &ListParams) -> Result<Self, ApiError> {
        let pattern = if params.search.is_empty() {
            None
        } else {
            Some(format!("%{}%", escape_like(&params.search)))
        };
        let category_id = match params.category.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| ApiError::validation("Category must be a numeric id"))?,
            ),
        };
        Ok(Self {
            pattern,
            category_id,
            page: params.page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort: SortColumn::from_param(params.sort.as_deref()),
            order: SortOrder::from_param(params.order.as_deref()),
        })
    }

    /// The `%…%` pattern bound once and reused for both ILIKE positions.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn category_id(&self) -> Option<i32> {
        self.category_id
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        // page is clamped below but unbounded above; saturate so any page
        // stays a valid OFFSET instead of overflowing.
        (self.page - 1).saturating_mul(self.limit)
    }

    fn filter_clause(&self) -> String {
        let mut conditions = Vec::new();
        let mut idx = 1;
        if self.pattern.is_some() {
            conditions.push(format!(
                "(p.name ILIKE ${idx} OR p.description ILIKE ${idx})"
            ));
            idx += 1;
        }
        if self.category_id.is_some() {
            conditions.push(format!("p.category_id = ${idx}"));
        }
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    fn filter_binds(&self) -> i64 {
        self.pattern.is_some() as i64 + self.category_id.is_some() as i64
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM products p{}", self.filter_clause())
    }

    pub fn page_sql(&self) -> String {
        let limit_idx = self.filter_binds() + 1;
        format!(
            "SELECT p.id, p.name, p.description, p.price, p.stock, p.category_id, p.created_by, \
             p.created_at, p.updated_at, c.name AS category_name, u.name AS creator_name \
             FROM products p \
             LEFT JOIN categories c ON p.category_id = c.id \
             LEFT JOIN users u ON p.created_by = u.id\
             {} ORDER BY p.{} {} LIMIT ${} OFFSET ${}",
            self.filter_clause(),
            self.sort.column(),
            self.order.keyword(),
            limit_idx,
            limit_idx + 1,
        )
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: self.total_pages(total),
        }
    }

    fn total_pages(&self, total: i64) -> i64 {
        // limit is clamped to at least 1, so ceiling division is safe.
        (total + self.limit - 1) / self.limit
    }
}
