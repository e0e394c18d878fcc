//! AND-of-OR predicate composition shared by WHERE and HAVING.
//!
//! Each WHERE or HAVING call contributes one OR-group; a clause's groups are
//! combined with AND:
//!
//! ```text
//! match = ∀ group ∈ groups : ∃ predicate ∈ group : predicate(item)
//! ```
//!
//! With no groups the match is vacuously true.

/// A boolean test over `T`.
///
/// Implemented for every `Fn(&T) -> bool` closure and for
/// [`FieldClause`](crate::FieldClause), so both can be mixed in one query.
pub trait Predicate<T: ?Sized> {
    /// Returns `true` if the item passes.
    fn test(&self, item: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn test(&self, item: &T) -> bool {
        self(item)
    }
}

/// Boxed predicate stored by a query.
pub type BoxPredicate<'q, T> = Box<dyn Predicate<T> + 'q>;

/// Ordered list of OR-groups, combined with AND.
pub struct PredicateGroups<'q, T: ?Sized> {
    groups: Vec<Vec<BoxPredicate<'q, T>>>,
}

impl<'q, T: ?Sized> PredicateGroups<'q, T> {
    /// Creates an empty list, which matches everything.
    pub fn new() -> Self {
        PredicateGroups { groups: Vec::new() }
    }

    /// Appends one OR-group.
    ///
    /// Returns `false` and records nothing when `predicates` is empty.
    pub fn push_any<I, P>(&mut self, predicates: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: Predicate<T> + 'q,
    {
        let group: Vec<BoxPredicate<'q, T>> = predicates
            .into_iter()
            .map(|p| Box::new(p) as BoxPredicate<'q, T>)
            .collect();

        if group.is_empty() {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Number of registered OR-groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no group has been registered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Tests an item against every group.
    pub fn matches(&self, item: &T) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|predicate| (**predicate).test(item)))
    }
}

impl<T: ?Sized> Default for PredicateGroups<'_, T> {
    fn default() -> Self {
        PredicateGroups::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for PredicateGroups<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<usize> = self.groups.iter().map(Vec::len).collect();
        f.debug_struct("PredicateGroups")
            .field("group_sizes", &sizes)
            .finish()
    }
}
