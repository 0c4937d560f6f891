//! Page-number pagination.
//!
//! Out-of-range input never errors: a missing or non-numeric page falls back to
//! the first page, and a number outside `1..=num_pages` falls back to the last.

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    count: u64,
    per_page: u32,
}

impl Paginator {
    pub fn new(count: u64, per_page: u32) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// Always at least one page, even for an empty result set.
    pub fn num_pages(&self) -> u32 {
        if self.count == 0 {
            return 1;
        }
        let pages = self.count.div_ceil(self.per_page as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Resolves raw `?page=` input to a valid page number.
    pub fn resolve_page(&self, raw: Option<&str>) -> u32 {
        let Some(raw) = raw else {
            return 1;
        };
        match raw.trim().parse::<i64>() {
            Ok(number) if number >= 1 && number <= self.num_pages() as i64 => number as u32,
            Ok(_) => self.num_pages(),
            Err(_) => 1,
        }
    }

    /// Offset and limit of `number` for slicing the underlying query.
    pub fn bounds(&self, number: u32) -> (u32, u32) {
        let offset = (number.saturating_sub(1)).saturating_mul(self.per_page);
        (offset, self.per_page)
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        let number = number.clamp(1, num_pages);
        let start_index = if self.count == 0 {
            0
        } else {
            (number as u64 - 1) * self.per_page as u64 + 1
        };

        Page {
            number,
            num_pages,
            count: self.count,
            has_previous: number > 1,
            has_next: number < num_pages,
            has_other_pages: number > 1 || number < num_pages,
            previous_page_number: (number > 1).then(|| number - 1),
            next_page_number: (number < num_pages).then(|| number + 1),
            start_index,
            object_list: items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub has_other_pages: bool,
    pub previous_page_number: Option<u32>,
    pub next_page_number: Option<u32>,
    pub start_index: u64,
    pub object_list: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            has_other_pages: self.has_other_pages,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
            start_index: self.start_index,
            object_list: self.object_list.into_iter().map(f).collect(),
        }
    }
}

/// Builds the `?page=N` link for `number`, keeping an active search term.
pub fn page_query(number: u32, search: Option<&str>) -> String {
    let number = number.to_string();
    let mut params = vec![("page", number.as_str())];
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        params.push(("search", search));
    }
    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("?{}", query),
        Err(_) => format!("?page={}", number),
    }
}
