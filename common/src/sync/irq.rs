use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Implemented by the architecture layer in [`crate::arch`].
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);
}

/// Run `f` with interrupts masked, restoring the previous state afterwards.
///
/// Nesting is safe: the saved state is restored, not unconditionally
/// re-enabled, so an already-masked caller stays masked.
pub fn with_masked<I: IrqControl, T>(f: impl FnOnce() -> T) -> T {
    let state = I::disable();
    let result = f();
    I::restore(state);
    result
}
