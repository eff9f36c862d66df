use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Text sanitization capability consumed by [`SanitizingRequest`](crate::SanitizingRequest).
///
/// A `Sanitizer` strips or neutralizes constructs that a downstream consumer
/// (typically a browser) could interpret as executable markup or script.
///
/// # Invariants
///
/// Implementations MUST be:
/// - **Total**: every string input produces an output, never a failure
/// - **Deterministic**: the same input always produces the same output
/// - **Idempotent**: `sanitize(sanitize(x)) == sanitize(x)`
/// - **Stateless**: safe to call concurrently from many requests
///
/// Returning `Cow::Borrowed` signals that the input was already clean and
/// lets callers skip an allocation.
///
/// # Examples
///
/// ```
/// use request_sanitizer::{MarkupStripper, Sanitizer};
///
/// let stripper = MarkupStripper::new();
/// assert_eq!(stripper.sanitize("<b>bold</b> text"), "bold text");
/// assert_eq!(stripper.sanitize("plain"), "plain");
/// ```
pub trait Sanitizer: Send + Sync {
    /// Sanitizes `input`, borrowing it unchanged when nothing needs rewriting.
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<S: Sanitizer + ?Sized> Sanitizer for &S {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (**self).sanitize(input)
    }
}

impl<S: Sanitizer + ?Sized> Sanitizer for Arc<S> {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (**self).sanitize(input)
    }
}

impl<S: Sanitizer + ?Sized> Sanitizer for Box<S> {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (**self).sanitize(input)
    }
}

/// A sanitizer that returns its input unchanged (for testing only).
///
/// **WARNING:** This sanitizer neutralizes NOTHING. It exists for tests and
/// for deployments that need the body replay behavior without rewriting.
///
/// # Examples
///
/// ```
/// use request_sanitizer::{PassthroughSanitizer, Sanitizer};
///
/// let sanitizer = PassthroughSanitizer;
/// assert_eq!(sanitizer.sanitize("<script>"), "<script>");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSanitizer;

impl Sanitizer for PassthroughSanitizer {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(input)
    }
}

/// Adapts a plain function or closure into a [`Sanitizer`].
///
/// The closure must uphold the same invariants as any other sanitizer.
///
/// # Examples
///
/// ```
/// use request_sanitizer::{FnSanitizer, Sanitizer};
///
/// let no_brackets = FnSanitizer::new(|s: &str| s.replace(['<', '>'], ""));
/// assert_eq!(no_brackets.sanitize("<i>x"), "ix");
/// ```
#[derive(Clone, Copy)]
pub struct FnSanitizer<F> {
    f: F,
}

impl<F> FnSanitizer<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    /// Wraps `f` as a sanitizer.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Sanitizer for FnSanitizer<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let output = (self.f)(input);
        if output == input {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(output)
        }
    }
}

impl<F> fmt::Debug for FnSanitizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSanitizer").finish_non_exhaustive()
    }
}

/// Elements whose entire content is removed along with their tags, as
/// (opening prefix, closing prefix) pairs.
const RAW_TEXT_ELEMENTS: [(&str, &str); 2] = [("<script", "</script"), ("<style", "</style")];

/// URL schemes that execute code when followed.
const DANGEROUS_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "livescript:"];

/// The built-in markup-stripping sanitizer.
///
/// `MarkupStripper` removes markup instead of escaping it, which keeps it
/// idempotent: escaping `&` would grow the text on every pass.
///
/// Rules, applied in order:
/// 1. `<script>` and `<style>` elements are removed together with their
///    content (case-insensitive). An unterminated element swallows the rest
///    of the input.
/// 2. Every remaining `<...>` tag is removed.
/// 3. Stray `<` and `>` characters are removed.
/// 4. `javascript:`, `vbscript:` and `livescript:` schemes are removed until
///    none remain.
///
/// The output never contains an angle bracket.
///
/// # Examples
///
/// ```
/// use request_sanitizer::{MarkupStripper, Sanitizer};
///
/// let stripper = MarkupStripper::new();
///
/// assert_eq!(stripper.sanitize("<script>alert(1)</script>hi"), "hi");
/// assert_eq!(stripper.sanitize("<a href=\"javascript:x()\">go</a>"), "go");
/// assert_eq!(stripper.sanitize("x javascript:alert(1)"), "x alert(1)");
/// assert_eq!(stripper.sanitize("1 < 2"), "1  2");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupStripper;

impl MarkupStripper {
    /// Creates the default markup stripper.
    pub fn new() -> Self {
        Self
    }

    fn needs_stripping(input: &str) -> bool {
        input.contains(['<', '>'])
            || DANGEROUS_SCHEMES
                .iter()
                .any(|scheme| find_ignore_ascii_case(input, scheme).is_some())
    }
}

impl Sanitizer for MarkupStripper {
    fn sanitize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !Self::needs_stripping(input) {
            return Cow::Borrowed(input);
        }

        let text = strip_raw_text_elements(input);
        let text = strip_tags(&text);
        Cow::Owned(strip_schemes(text))
    }
}

fn strip_raw_text_elements(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let next = RAW_TEXT_ELEMENTS
            .iter()
            .filter_map(|&(open, close)| find_ignore_ascii_case(rest, open).map(|pos| (pos, close)))
            .min_by_key(|(pos, _)| *pos);

        let Some((start, close_prefix)) = next else {
            out.push_str(rest);
            return out;
        };

        out.push_str(&rest[..start]);
        let element = &rest[start..];
        rest = match find_ignore_ascii_case(element, close_prefix) {
            Some(close) => {
                let closing_tag = &element[close..];
                match closing_tag.find('>') {
                    Some(gt) => &closing_tag[gt + 1..],
                    None => "",
                }
            }
            None => "",
        };
    }
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['<', '>']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        rest = if tail.starts_with('<') {
            match tail.find('>') {
                Some(gt) => &tail[gt + 1..],
                None => &tail[1..],
            }
        } else {
            &tail[1..]
        };
    }

    out.push_str(rest);
    out
}

fn strip_schemes(mut text: String) -> String {
    // Removing one scheme can splice together another, so run to a fixpoint.
    loop {
        let mut changed = false;
        for scheme in DANGEROUS_SCHEMES {
            while let Some(pos) = find_ignore_ascii_case(&text, scheme) {
                text.replace_range(pos..pos + scheme.len(), "");
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

/// Finds an ASCII `needle` in `haystack`, ignoring ASCII case.
///
/// The returned offset is always a char boundary since the match starts on
/// an ASCII byte.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_borrowed() {
        let stripper = MarkupStripper::new();
        assert!(matches!(stripper.sanitize("hello world"), Cow::Borrowed(_)));
    }

    #[test]
    fn script_block_is_removed_with_content() {
        let stripper = MarkupStripper::new();
        assert_eq!(
            stripper.sanitize(r#"{"name":"<script>alert(1)</script>"}"#),
            r#"{"name":""}"#
        );
    }

    #[test]
    fn script_matching_ignores_case() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("a<ScRiPt type=x>evil()</SCRIPT >b"), "ab");
    }

    #[test]
    fn unterminated_script_swallows_rest() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("keep<script>alert(1)"), "keep");
    }

    #[test]
    fn style_block_is_removed() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("x<style>body{}</style>y"), "xy");
    }

    #[test]
    fn each_element_closes_on_its_own_tag() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("<script>a</style>b</script>c"), "c");
        assert_eq!(stripper.sanitize("<STYLE>a</script>b</Style>c"), "c");
        assert_eq!(
            stripper.sanitize("1<style>s</style>2<script>x</script>3"),
            "123"
        );
    }

    #[test]
    fn plain_tags_are_removed_but_text_kept() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("<b>evil</b>"), "evil");
        assert_eq!(stripper.sanitize("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn stray_brackets_are_removed() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("a > b"), "a  b");
        assert_eq!(stripper.sanitize("unclosed <tag"), "unclosed tag");
    }

    #[test]
    fn spliced_schemes_are_removed() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("javajavascript:script:alert(1)"), "alert(1)");
        assert_eq!(stripper.sanitize("VBScript:msgbox"), "msgbox");
    }

    #[test]
    fn non_ascii_text_survives() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.sanitize("<p>héllo 世界</p>"), "héllo 世界");
    }

    #[test]
    fn stripping_is_idempotent() {
        let stripper = MarkupStripper::new();
        let inputs = [
            "<scr<script>x</script>ipt>alert(1)</script>",
            "<<b>>b<</b>>",
            "javascript:<x>javascript:",
            "plain text",
        ];
        for input in inputs {
            let once = stripper.sanitize(input).into_owned();
            let twice = stripper.sanitize(&once).into_owned();
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn passthrough_returns_input() {
        assert_eq!(PassthroughSanitizer.sanitize("<b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn fn_sanitizer_borrows_unchanged_output() {
        let sanitizer = FnSanitizer::new(|s: &str| s.replace("bad", ""));
        assert!(matches!(sanitizer.sanitize("good"), Cow::Borrowed(_)));
        assert_eq!(sanitizer.sanitize("so bad"), "so ");
    }

    #[test]
    fn shared_sanitizers_delegate() {
        let shared: Arc<dyn Sanitizer> = Arc::new(MarkupStripper::new());
        assert_eq!(shared.sanitize("<i>x</i>"), "x");

        let boxed: Box<dyn Sanitizer> = Box::new(PassthroughSanitizer);
        assert_eq!(boxed.sanitize("<i>x</i>"), "<i>x</i>");
    }

    #[test]
    fn find_ignore_ascii_case_handles_multibyte_haystack() {
        assert_eq!(find_ignore_ascii_case("é<SCRIPT", "<script"), Some(2));
        assert_eq!(find_ignore_ascii_case("abc", "abcd"), None);
    }

    mod proptests {
        use super::*;
        use crate::test_utils::arb_markup_text;
        use proptest::prelude::*;

        proptest! {
            /// Property: stripped output never contains an angle bracket
            #[test]
            fn proptest_output_has_no_brackets(input in arb_markup_text()) {
                let output = MarkupStripper::new().sanitize(&input).into_owned();
                prop_assert!(!output.contains('<'));
                prop_assert!(!output.contains('>'));
            }

            /// Property: stripping twice equals stripping once
            #[test]
            fn proptest_stripping_is_idempotent(input in arb_markup_text()) {
                let stripper = MarkupStripper::new();
                let once = stripper.sanitize(&input).into_owned();
                let twice = stripper.sanitize(&once).into_owned();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
