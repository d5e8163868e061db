use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Raw page/limit query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// Clamp into a valid page: `page >= 1`, `limit` in `[1, 100]`.
    pub fn normalize(&self) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        Page { page, limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: if total == 0 {
                0
            } else {
                (total + self.limit - 1) / self.limit
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let page = PageParams::default().normalize();
        assert_eq!(page, Page { page: 1, limit: DEFAULT_PAGE_LIMIT });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let page = PageParams { page: Some(0), limit: Some(500) }.normalize();
        assert_eq!(page, Page { page: 1, limit: MAX_PAGE_LIMIT });

        let page = PageParams { page: Some(-3), limit: Some(0) }.normalize();
        assert_eq!(page, Page { page: 1, limit: 1 });
    }

    #[test]
    fn offset_and_page_count() {
        let page = PageParams { page: Some(3), limit: Some(20) }.normalize();
        assert_eq!(page.offset(), 40);

        let meta = page.meta(41);
        assert_eq!(meta.total_pages, 3);

        let meta = page.meta(0);
        assert_eq!(meta.total_pages, 0);
    }
}
