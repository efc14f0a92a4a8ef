mod entity;

use proc_macro::TokenStream;

/// Derive macro for `TypedEntity`.
///
/// Binds a struct to the entity collection it is stored in. The collection
/// name defaults to the struct name; override it with `#[entity(name = "...")]`.
///
/// # Usage
///
/// ```ignore
/// use entity_store::TypedEntity;
///
/// #[derive(Serialize, Deserialize, TypedEntity)]
/// #[entity(name = "DailyUpdate")]
/// struct Update {
///     #[serde(default)]
///     id: String,
///     project_id: String,
///     notes: String,
/// }
/// ```
#[proc_macro_derive(TypedEntity, attributes(entity))]
pub fn derive_typed_entity(input: TokenStream) -> TokenStream {
    entity::derive_typed_entity(input)
}
