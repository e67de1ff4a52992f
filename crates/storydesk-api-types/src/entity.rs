use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type served by one REST collection.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment under `/api/admin/`, e.g. `sub-sectors`.
    const COLLECTION: &'static str;
    /// Singular human label used in logs and notifications.
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn display_name(&self) -> &str;

    /// Names of required fields that are currently blank.
    fn missing_fields(&self) -> Vec<&'static str> {
        if self.display_name().trim().is_empty() {
            vec!["name"]
        } else {
            Vec::new()
        }
    }

    /// Text columns consulted by in-memory search.
    fn search_fields(&self) -> Vec<&str> {
        vec![self.display_name()]
    }

    /// Case-insensitive substring match over [`Entity::search_fields`].
    fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn sort_key(&self) -> String {
        self.display_name().to_lowercase()
    }
}

/// Implements [`Entity`] for a record whose display name is a single string field.
macro_rules! named_entity {
    (
        $ty:ty,
        collection = $collection:literal,
        label = $label:literal,
        name = $name:ident
        $(, search = [$($extra:ident),* $(,)?])?
    ) => {
        impl $crate::entity::Entity for $ty {
            const COLLECTION: &'static str = $collection;
            const LABEL: &'static str = $label;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn display_name(&self) -> &str {
                &self.$name
            }

            fn missing_fields(&self) -> Vec<&'static str> {
                if self.$name.trim().is_empty() {
                    vec![stringify!($name)]
                } else {
                    Vec::new()
                }
            }

            fn search_fields(&self) -> Vec<&str> {
                #[allow(unused_mut)]
                let mut fields = vec![self.$name.as_str()];
                $($(
                    if let Some(value) = self.$extra.as_deref() {
                        fields.push(value);
                    }
                )*)?
                fields
            }
        }
    };
}

pub(crate) use named_entity;
