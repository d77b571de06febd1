use std::sync::Mutex;

use crate::actions::{Notice, NoticeSink};

/// Collects published notices for assertions.
#[derive(Default)]
pub struct RecordingNoticeSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNoticeSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices published so far, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn publish(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
