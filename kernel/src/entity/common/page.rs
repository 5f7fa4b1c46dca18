use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

use crate::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct PageNumber(i64);

impl PageNumber {
    pub fn new(value: impl Into<i64>) -> Self {
        Self(value.into())
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct PageSize(i64);

impl PageSize {
    pub fn new(value: impl Into<i64>) -> Self {
        Self(value.into())
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::new(30)
    }
}

/// 1-based page request.
#[derive(Debug, Clone, PartialEq, Eq, Default, References, Serialize, Deserialize)]
pub struct PageSelection {
    page: PageNumber,
    size: PageSize,
}

impl PageSelection {
    pub fn new(page: PageNumber, size: PageSize) -> error_stack::Result<Self, KernelError> {
        if *page.as_ref() < 1 || *size.as_ref() < 1 {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "page and size must be positive, got page {} size {}",
                page.as_ref(),
                size.as_ref()
            )));
        }
        Ok(Self { page, size })
    }

    pub fn limit(&self) -> i64 {
        *self.size.as_ref()
    }

    pub fn offset(&self) -> i64 {
        (*self.page.as_ref() - 1) * *self.size.as_ref()
    }
}

/// One slice of a filtered result set, with the totals callers need to page
/// through the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total_items: i64,
    total_pages: i64,
    page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, selection: &PageSelection) -> Self {
        let size = selection.limit();
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + size - 1) / size
        };
        Self {
            items,
            total_items,
            total_pages,
            page: *selection.page().as_ref(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn selection_rejects_non_positive_values() {
        let zero_page = PageSelection::new(PageNumber::new(0), PageSize::new(10));
        assert!(zero_page.is_err());
        let zero_size = PageSelection::new(PageNumber::new(1), PageSize::new(0));
        assert!(zero_size.is_err());
    }

    #[test]
    fn offset_skips_previous_pages() {
        let selection = PageSelection::new(PageNumber::new(3), PageSize::new(10)).unwrap();
        assert_eq!(selection.offset(), 20);
        assert_eq!(selection.limit(), 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        let selection = PageSelection::new(PageNumber::new(1), PageSize::new(10)).unwrap();
        assert_eq!(Page::new(vec![1], 31, &selection).total_pages(), 4);
        assert_eq!(Page::new(vec![1], 30, &selection).total_pages(), 3);
        assert_eq!(Page::<i32>::new(vec![], 0, &selection).total_pages(), 0);
    }
}
