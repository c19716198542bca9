//! Pagination
//!
//! Page requests, page results and the lazy total-count decision.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Which slice of a result set to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRequest {
    Paged { page: i64, size: i64 },
    Unpaged,
}

impl PageRequest {
    /// Page `page` (zero based) of `size` rows
    pub fn of(page: i64, size: i64) -> Result<Self, StoreError> {
        if page < 0 {
            return Err(StoreError::validation(format!(
                "Page index must not be negative, got {}",
                page
            )));
        }
        if size < 1 {
            return Err(StoreError::validation(format!(
                "Page size must be at least 1, got {}",
                size
            )));
        }
        Ok(Self::Paged { page, size })
    }

    /// Everything in one page
    pub fn unpaged() -> Self {
        Self::Unpaged
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, Self::Paged { .. })
    }

    pub fn page_number(&self) -> i64 {
        match self {
            Self::Paged { page, .. } => *page,
            Self::Unpaged => 0,
        }
    }

    /// Requested page size, `None` when unpaged
    pub fn page_size(&self) -> Option<i64> {
        match self {
            Self::Paged { size, .. } => Some(*size),
            Self::Unpaged => None,
        }
    }

    /// page × size
    pub fn offset(&self) -> i64 {
        match self {
            Self::Paged { page, size } => page.saturating_mul(*size),
            Self::Unpaged => 0,
        }
    }

    /// (offset, limit) for paged requests
    pub fn bounds(&self) -> Option<(i64, i64)> {
        self.page_size().map(|size| (self.offset(), size))
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Paged { page, size } => Self::Paged {
                page: page.saturating_add(1),
                size: *size,
            },
            Self::Unpaged => Self::Unpaged,
        }
    }

    pub fn previous_or_first(&self) -> Self {
        match self {
            Self::Paged { page, size } => Self::Paged {
                page: (page - 1).max(0),
                size: *size,
            },
            Self::Unpaged => Self::Unpaged,
        }
    }

    /// Cap the page size at `max_size`
    pub fn clamped(self, max_size: i64) -> Self {
        match self {
            Self::Paged { page, size } => Self::Paged {
                page,
                size: size.min(max_size.max(1)),
            },
            Self::Unpaged => Self::Unpaged,
        }
    }
}

/// Total row count when it can be read off the content page, `None` when a
/// count query is required.
///
/// * unpaged: the content is everything
/// * first page not full: the first page is also the last one
/// * later page neither full nor empty: a short last page ends at offset + len
///
/// A full page may be followed by more rows. An empty page past the first
/// says nothing about how many rows precede it.
pub fn known_total(request: &PageRequest, content_len: usize) -> Option<i64> {
    let len = i64::try_from(content_len).ok()?;

    let size = match request.page_size() {
        Some(size) => size,
        None => return Some(len),
    };

    let offset = request.offset();
    if offset == 0 {
        return (len < size).then_some(len);
    }

    (len != 0 && len < size).then(|| offset.saturating_add(len))
}

/// A page of results with the total number of matching rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        Self {
            content,
            request,
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> i64 {
        self.request.page_number()
    }

    /// Requested page size; for unpaged results the number of rows returned
    pub fn size(&self) -> i64 {
        self.request
            .page_size()
            .unwrap_or(self.content.len() as i64)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> i64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> i64 {
        match self.request.page_size() {
            Some(size) => self.total_elements / size + i64::from(self.total_elements % size != 0),
            None => 1,
        }
    }

    pub fn is_first(&self) -> bool {
        self.number() == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        self.number().saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number() > 0
    }

    /// Convert the content, keeping the paging information
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }
}
