/// Side effects requested by the store. The owner of the store runs them;
/// none of them may feed a new action back into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PersistState,
}
