//! Shared fakes and proptest strategies for unit tests.

use std::borrow::Cow;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use proptest::prelude::*;

use crate::sanitizer::{MarkupStripper, Sanitizer};
use crate::web::{HostRequest, ParameterMap, CONTENT_TYPE};

/// Strategy: text mixing plain words with markup fragments
pub(crate) fn arb_markup_text() -> impl Strategy<Value = String> {
    let markup = prop::sample::select(vec![
        "<script>",
        "</script>",
        "<ScRiPt src=x>",
        "<style>",
        "<b>",
        "</b>",
        "<",
        ">",
        "javascript:",
        "java",
        "script:",
        "é世",
    ])
    .prop_map(str::to_string);
    let fragment = prop_oneof![
        prop::string::string_regex("[a-zA-Z0-9 ]{0,8}").unwrap(),
        markup,
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}

/// A sanitizer that records every input before delegating to `MarkupStripper`.
#[derive(Debug, Default)]
pub(crate) struct SpySanitizer {
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl SpySanitizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Sanitizer for SpySanitizer {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input.to_string());
        MarkupStripper::new().sanitize(input)
    }
}

/// A reader that serves `data` for `ok_reads` calls, then fails.
#[derive(Debug)]
pub(crate) struct FlakyReader {
    data: &'static [u8],
    ok_reads: usize,
}

impl FlakyReader {
    pub(crate) fn new(data: &'static [u8], ok_reads: usize) -> Self {
        Self { data, ok_reads }
    }
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.ok_reads == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
        }
        self.ok_reads -= 1;
        self.data.read(buf)
    }
}

/// A text request whose transport fails partway through the body.
#[derive(Debug)]
pub(crate) struct FlakyRequest {
    content_type: String,
    opens: usize,
}

impl FlakyRequest {
    pub(crate) fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            opens: 0,
        }
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens
    }
}

impl HostRequest for FlakyRequest {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        name.eq_ignore_ascii_case(CONTENT_TYPE)
            .then(|| Cow::Borrowed(self.content_type.as_str()))
    }

    fn parameter_values(&self, _name: &str) -> Option<Vec<Cow<'_, str>>> {
        None
    }

    fn parameter_map(&self) -> ParameterMap {
        ParameterMap::new()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        self.opens += 1;
        Ok(Box::new(FlakyReader::new(b"<b>partial", 1)))
    }
}

/// Installs a thread-local subscriber that writes through the test harness.
pub(crate) fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
