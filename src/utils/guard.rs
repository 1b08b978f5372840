/// Runs a cleanup closure when dropped.
///
/// Used to put the terminal back into cooked mode on every way out of
/// `main`, including early returns through `?` and unwinding panics.
pub struct RestoreGuard<F: FnOnce()> {
    on_drop: Option<F>,
}

impl<F: FnOnce()> RestoreGuard<F> {
    pub fn with(f: F) -> Self {
        Self { on_drop: Some(f) }
    }
}

impl<F: FnOnce()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_runs_once_on_drop() {
        let runs = Cell::new(0);
        {
            let _guard = RestoreGuard::with(|| runs.set(runs.get() + 1));
        }
        assert_eq!(runs.get(), 1);
    }
}
