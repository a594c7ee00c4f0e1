//! Macros for reducing boilerplate when defining synced records
//!
//! Every record carries the same four bookkeeping columns (`id`, `user_id`,
//! `created_at`, `updated_at`) and merges patches field by field, so the
//! `Entity` implementation is generated rather than written out per table.

/// Implement `Entity` for a record struct
///
/// The struct must have `id: Uuid`, `user_id: Uuid`, `created_at` and
/// `updated_at: DateTime<Utc>` fields. Each field listed in the patch block
/// must exist on both the record and the patch, with the patch field wrapped
/// in one more `Option` than the record field (`Option<String>` for a
/// `String` column, `Option<Option<Uuid>>` for a nullable reference).
///
/// # Example
///
/// ```rust,ignore
/// impl_entity!(
///     Client,
///     table: "clients",
///     singular: "client",
///     draft: NewClient,
///     patch: ClientPatch { name, contact_name, email, phone, status },
/// );
///
/// impl_entity!(
///     Project,
///     table: "projects",
///     singular: "project",
///     draft: NewProject,
///     patch: ProjectPatch { name, client_id },
///     embeds: PROJECT_EMBEDS,
/// );
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $type:ident,
        table: $table:literal,
        singular: $singular:literal,
        draft: $draft:ty,
        patch: $patch:ident { $( $field:ident ),* $(,)? }
        $(, embeds: $embeds:expr )?
        $(,)?
    ) => {
        impl $crate::core::entity::Entity for $type {
            type Draft = $draft;
            type Patch = $patch;

            fn resource_name() -> &'static str {
                $table
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            $(
                fn embeds() -> &'static [$crate::core::query::Embed] {
                    $embeds
                }
            )?

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn owner_id(&self) -> ::uuid::Uuid {
                self.user_id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self, at: ::chrono::DateTime<::chrono::Utc>) {
                self.updated_at = at;
            }

            fn apply_patch(&mut self, patch: &$patch) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = value.clone();
                    }
                )*
            }
        }
    };
}

/// Define a status label enum that keeps unknown labels
///
/// Statuses travel as their display label ("In Progress"). Labels outside
/// the known set deserialise into `Other` and serialise back unchanged.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A label outside the known set
            Other(String),
        }

        impl $name {
            /// Display label as stored remotely
            pub fn label(&self) -> &str {
                match self {
                    $( Self::$variant => $label, )+
                    Self::Other(label) => label,
                }
            }

            /// Lower-case, hyphenated form used by status filters ("in-progress")
            pub fn slug(&self) -> String {
                self.label().to_lowercase().replace(' ', "-")
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                match label.as_str() {
                    $( $label => Self::$variant, )+
                    _ => Self::Other(label),
                }
            }
        }

        impl From<&str> for $name {
            fn from(label: &str) -> Self {
                Self::from(label.to_string())
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> String {
                match status {
                    $name::Other(label) => label,
                    known => known.label().to_string(),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}
