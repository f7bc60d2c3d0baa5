//! Progress-callback trait for workbook and preview builds.
//!
//! Pass a `&dyn BuildProgressCallback` to the functions in
//! [`crate::workbook`] to receive an event per worksheet as the build runs.
//!
//! # Why callbacks instead of return values?
//!
//! A build can touch dozens of worksheets. The callback lets the caller drive
//! a terminal progress bar or a log line per document without the library
//! knowing how it is displayed. All methods have default no-op
//! implementations so callers only override what they care about.
//!
//! # Example
//!
//! ```rust
//! use worksheet_kit::BuildProgressCallback;
//! use std::cell::Cell;
//!
//! struct PageCounter {
//!     pages: Cell<usize>,
//! }
//!
//! impl BuildProgressCallback for PageCounter {
//!     fn on_document_complete(&self, _index: usize, _total: usize, _title: &str, pages: usize) {
//!         self.pages.set(self.pages.get() + pages);
//!     }
//! }
//!
//! let counter = PageCounter { pages: Cell::new(0) };
//! counter.on_document_complete(1, 3, "שיפוע", 2);
//! assert_eq!(counter.pages.get(), 2);
//! ```

/// Called by the build functions as they process each worksheet.
pub trait BuildProgressCallback {
    /// Called once before the first worksheet.
    ///
    /// # Arguments
    /// * `total`: number of worksheets that will be attempted
    fn on_build_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a worksheet is read.
    ///
    /// # Arguments
    /// * `index`: 1-based position in the build
    /// * `total`: worksheets in the build
    /// * `title`: banner title or file stem
    fn on_document_start(&self, index: usize, total: usize, title: &str) {
        let _ = (index, total, title);
    }

    /// Called when a worksheet has been converted.
    ///
    /// # Arguments
    /// * `pages`: A4 sheets produced for it
    fn on_document_complete(&self, index: usize, total: usize, title: &str, pages: usize) {
        let _ = (index, total, title, pages);
    }

    /// Called when a worksheet is skipped (its source file is missing).
    fn on_document_skipped(&self, index: usize, total: usize, reason: &str) {
        let _ = (index, total, reason);
    }

    /// Called once after every worksheet has been attempted.
    ///
    /// # Arguments
    /// * `documents`: worksheets included
    /// * `pages`: A4 sheets written in total
    fn on_build_complete(&self, documents: usize, pages: usize) {
        let _ = (documents, pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BuildProgressCallback for NoopProgressCallback {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Tracking {
        started: Cell<usize>,
        completed: RefCell<Vec<(String, usize)>>,
        skipped: Cell<usize>,
        finished: Cell<(usize, usize)>,
    }

    impl BuildProgressCallback for Tracking {
        fn on_build_start(&self, total: usize) {
            self.started.set(total);
        }

        fn on_document_complete(&self, _index: usize, _total: usize, title: &str, pages: usize) {
            self.completed.borrow_mut().push((title.to_string(), pages));
        }

        fn on_document_skipped(&self, _index: usize, _total: usize, _reason: &str) {
            self.skipped.set(self.skipped.get() + 1);
        }

        fn on_build_complete(&self, documents: usize, pages: usize) {
            self.finished.set((documents, pages));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_build_start(3);
        cb.on_document_start(1, 3, "א");
        cb.on_document_complete(1, 3, "א", 2);
        cb.on_document_skipped(2, 3, "missing");
        cb.on_build_complete(1, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = Tracking::default();
        let cb: &dyn BuildProgressCallback = &t;
        cb.on_build_start(2);
        cb.on_document_start(1, 2, "גרף");
        cb.on_document_complete(1, 2, "גרף", 3);
        cb.on_document_skipped(2, 2, "missing");
        cb.on_build_complete(1, 3);

        assert_eq!(t.started.get(), 2);
        assert_eq!(*t.completed.borrow(), vec![("גרף".to_string(), 3)]);
        assert_eq!(t.skipped.get(), 1);
        assert_eq!(t.finished.get(), (1, 3));
    }
}
