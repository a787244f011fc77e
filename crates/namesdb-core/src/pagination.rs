//! Conversions between the three paging vocabularies.
//!
//! - page number (1-indexed) with a fixed page size, used by page links;
//! - `limit`/`offset` (0-indexed), the engine's own vocabulary;
//! - `start..stop` slice bounds over a result list.

use std::ops::Range;

/// Highest row number the engine accepts (a signed 64-bit `from`).
pub const MAX_ROW: u64 = i64::MAX as u64;

/// Offset of the first row on `page`. Pages below 1 clamp to the first page.
pub fn es_offset(pagesize: u64, page: i64) -> u64 {
  let index = u64::try_from(page.saturating_sub(1)).unwrap_or(0);
  pagesize.saturating_mul(index)
}

/// Slice bounds covering `limit` rows from `offset`.
pub fn start_stop(limit: u64, offset: u64) -> Range<u64> {
  offset..offset.saturating_add(limit)
}

/// 1-indexed page number containing `offset`.
pub fn page_number(limit: u64, offset: u64) -> u64 { offset / limit.max(1) + 1 }

/// A resolved `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
  pub limit:  u64,
  pub offset: u64,
}

impl Paging {
  /// Resolve whatever paging params a caller sent.
  ///
  /// An explicit `offset` always wins over `page`. `limit` falls back to
  /// `page_size` in both modes and is capped at `max_limit`. The offset is
  /// capped so that `offset + limit` stays within [`MAX_ROW`].
  pub fn resolve(
    page: Option<i64>,
    limit: Option<u64>,
    offset: Option<u64>,
    page_size: u64,
    max_limit: u64,
  ) -> Self {
    let limit = limit
      .filter(|l| *l > 0)
      .unwrap_or(page_size)
      .clamp(1, max_limit.max(1));
    let offset = match (offset, page) {
      (Some(offset), _) => offset,
      (None, Some(page)) => es_offset(limit, page),
      (None, None) => 0,
    };
    let offset = offset.min(MAX_ROW - limit.min(MAX_ROW));
    Self { limit, offset }
  }

  pub fn range(self) -> Range<u64> { start_stop(self.limit, self.offset) }

  pub fn page(self) -> u64 { page_number(self.limit, self.offset) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn es_offset_examples() {
    assert_eq!(es_offset(10, 1), 0);
    assert_eq!(es_offset(10, 2), 10);
    assert_eq!(es_offset(10, 3), 20);
  }

  #[test]
  fn start_stop_examples() {
    assert_eq!(start_stop(10, 0), 0..10);
    assert_eq!(start_stop(10, 10), 10..20);
    assert_eq!(start_stop(10, 20), 20..30);
  }

  #[test]
  fn page_number_examples() {
    assert_eq!(page_number(10, 0), 1);
    assert_eq!(page_number(10, 10), 2);
    assert_eq!(page_number(10, 20), 3);
    assert_eq!(page_number(10, 25), 3);
  }

  #[test]
  fn consecutive_pages_are_one_pagesize_apart() {
    for pagesize in 1..=50 {
      for page in 1..=200 {
        assert_eq!(
          es_offset(pagesize, page + 1) - es_offset(pagesize, page),
          pagesize,
          "pagesize={pagesize} page={page}"
        );
      }
    }
  }

  #[test]
  fn non_positive_pages_clamp_to_zero_offset() {
    for pagesize in [1, 10, 25, 1000] {
      for page in [-1_000_000, -3, -1, 0] {
        assert_eq!(es_offset(pagesize, page), 0);
      }
      assert_eq!(es_offset(pagesize, i64::MIN), 0);
    }
  }

  #[test]
  fn page_round_trips_through_offset() {
    for limit in 1..=50 {
      for page in 1..=200 {
        let offset = es_offset(limit, page);
        assert_eq!(page_number(limit, offset), page as u64);
      }
    }
  }

  #[test]
  fn slice_length_is_limit() {
    for limit in 0..=40 {
      for offset in (0..500).step_by(7) {
        let r = start_stop(limit, offset);
        assert_eq!(r.end - r.start, limit);
        assert_eq!(r.start, offset);
      }
    }
  }

  #[test]
  fn resolve_defaults_to_first_page() {
    let p = Paging::resolve(None, None, None, 25, 1000);
    assert_eq!(p, Paging { limit: 25, offset: 0 });
    assert_eq!(p.page(), 1);
  }

  #[test]
  fn resolve_page_uses_page_size() {
    let p = Paging::resolve(Some(3), None, None, 25, 1000);
    assert_eq!(p, Paging { limit: 25, offset: 50 });
    assert_eq!(p.page(), 3);
  }

  #[test]
  fn resolve_explicit_offset_beats_page() {
    let p = Paging::resolve(Some(5), Some(10), Some(30), 25, 1000);
    assert_eq!(p, Paging { limit: 10, offset: 30 });
    let p = Paging::resolve(Some(5), None, Some(30), 25, 1000);
    assert_eq!(p, Paging { limit: 25, offset: 30 });
  }

  #[test]
  fn resolve_clamps_bad_values() {
    let p = Paging::resolve(Some(-2), Some(0), None, 25, 1000);
    assert_eq!(p, Paging { limit: 25, offset: 0 });
    let p = Paging::resolve(None, Some(50_000), None, 25, 1000);
    assert_eq!(p.limit, 1000);
  }

  #[test]
  fn resolve_caps_huge_offsets() {
    let p = Paging::resolve(None, Some(10), Some(u64::MAX - 5), 25, 1000);
    assert_eq!(p.offset, MAX_ROW - 10);
    assert_eq!(p.range().end, MAX_ROW);
    let p = Paging::resolve(Some(i64::MAX), None, None, 25, 1000);
    assert_eq!(p.offset + p.limit, MAX_ROW);
  }
}
