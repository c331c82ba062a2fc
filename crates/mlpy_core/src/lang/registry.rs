//! Shareable metadata for `mlpy_core::lang` registries.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Every registry is ordered by its id enum's discriminants; `lang_registry_guardrails` checks that invariant so
//!   `info_for` can index the table directly.

/// Shared metadata shape for registry-first vocabulary items.
///
/// ## Examples
/// ```rust
/// use mlpy_core::lang::registry::LangItemInfo;
///
/// let item: LangItemInfo<u8> = LangItemInfo {
///     id: 0,
///     canonical: "copy",
///     aliases: &[],
///     description: "Materialize an independent copy of a value.",
/// };
/// assert_eq!(item.canonical, "copy");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}
