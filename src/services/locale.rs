//! The current locale as an explicit value.
//!
//! Everything that reads or writes translated fields takes a
//! [`LocaleContext`] instead of consulting process-wide state.
//! [`LocaleContext::with_locale`] switches it for the duration of a closure.

use crate::models::Locale;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    current: Locale,
}

impl LocaleContext {
    pub fn new(locale: impl Into<Locale>) -> Self {
        Self {
            current: locale.into(),
        }
    }

    pub fn current(&self) -> &Locale {
        &self.current
    }

    /// Runs `work` with `locale` as the current locale.
    ///
    /// The previous locale is put back however `work` exits: a normal return,
    /// an `Err` value, or a panic unwinding through this frame. Nested calls
    /// restore the enclosing call's locale.
    pub fn with_locale<T, F>(&mut self, locale: &Locale, work: F) -> T
    where
        F: FnOnce(&mut LocaleContext) -> T,
    {
        let previous = std::mem::replace(&mut self.current, locale.clone());
        let guard = Restore {
            ctx: self,
            previous: Some(previous),
        };
        let result = work(&mut *guard.ctx);
        drop(guard);
        result
    }
}

struct Restore<'a> {
    ctx: &'a mut LocaleContext,
    previous: Option<Locale>,
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.ctx.current = previous;
        }
    }
}
