/// Kotlin style scope functions, used to keep long method chains flowing.
pub trait LetAlso: Sized {
    /// Passes `self` by value into `f` and returns the result.
    fn let_owned<R, F: FnOnce(Self) -> R>(self, f: F) -> R {
        f(self)
    }

    /// Passes `self` by reference into `f` and returns the result.
    fn let_ref<R, F: FnOnce(&Self) -> R>(&self, f: F) -> R {
        f(self)
    }

    /// Calls `f` with a mutable reference and returns `self` afterwards.
    fn also<F: FnOnce(&mut Self)>(mut self, f: F) -> Self {
        f(&mut self);
        self
    }
}

impl<T> LetAlso for T {}
