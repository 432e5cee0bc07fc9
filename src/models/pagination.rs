//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.map(|p| p as i64),
            page_size: per_page.map(|p| p as i64),
        }
    }

    pub fn get_offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1) * self.get_limit()
    }

    pub fn get_limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let p = PaginationParams::new(Some(3), Some(25));
        assert_eq!(p.get_limit(), 25);
        assert_eq!(p.get_offset(), 50);
    }

    #[test]
    fn test_defaults_and_clamping() {
        let p = PaginationParams::new(None, None);
        assert_eq!(p.get_limit(), 20);
        assert_eq!(p.get_offset(), 0);

        let p = PaginationParams::new(Some(0), Some(10_000));
        assert_eq!(p.get_limit(), 100);
        assert_eq!(p.get_offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let page: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 0);
        assert_eq!(page.total_pages, 0);
        let page: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 41);
        assert_eq!(page.total_pages, 3);
    }
}
