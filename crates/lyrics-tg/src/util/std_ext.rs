use easy_ext::ext;
use std::borrow::Cow;

pub(crate) mod prelude {
    pub(crate) use super::ErrorExt as _;
    pub(crate) use super::StrExt as _;
}

#[ext(ErrorExt)]
pub(crate) impl<E> E
where
    E: std::error::Error + ?Sized,
{
    fn display_chain(&self) -> display_error_chain::DisplayErrorChain<&Self> {
        display_error_chain::DisplayErrorChain::new(self)
    }
}

#[ext(StrExt)]
pub(crate) impl str {
    /// Cuts the string to at most `max_chars` characters (not bytes).
    fn truncate_chars(&self, max_chars: usize) -> &str {
        match self.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self[..byte_idx],
            None => self,
        }
    }

    /// Same as [`StrExt::truncate_chars`], but appends the `marker` if the
    /// string was actually truncated.
    fn truncate_chars_with_marker(&self, max_chars: usize, marker: &str) -> Cow<'_, str> {
        let truncated = self.truncate_chars(max_chars);
        if truncated.len() == self.len() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(format!("{truncated}{marker}"))
    }

    /// Number of UTF-16 code units. This is the unit Telegram uses to measure
    /// the length of messages.
    fn utf16_len(&self) -> usize {
        self.encode_utf16().count()
    }
}
