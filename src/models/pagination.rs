use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw `?page=&limit=` values; unparseable input falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn from_query(query: &PageQuery) -> Self {
        let positive = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v >= 1)
        };

        Self {
            page: positive(&query.page).unwrap_or(1),
            limit: positive(&query.limit)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let limit = i64::from(self.limit);
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_defaults_and_bounds() {
        assert_eq!(Pagination::from_query(&query(None, None)), Pagination::default());
        assert_eq!(
            Pagination::from_query(&query(Some("3"), Some("500"))),
            Pagination { page: 3, limit: 100 }
        );
        assert_eq!(
            Pagination::from_query(&query(Some("0"), Some("abc"))),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(
            Pagination::from_query(&query(Some("-2"), Some("0"))),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(Pagination { page: 4, limit: 25 }.offset(), 75);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(p.meta(0).total_pages, 0);
        assert_eq!(p.meta(10).total_pages, 1);
        assert_eq!(p.meta(11).total_pages, 2);
        assert_eq!(Pagination { page: 1, limit: 3 }.meta(7).total_pages, 3);
    }
}
