/// Declares a closed label enum with a `Custom(String)` escape hatch.
///
/// Every variant maps to exactly one label. Serialization, `Display` and
/// `parse` all go through that label; unknown labels become `Custom`.
#[macro_export]
macro_rules! define_label_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Custom(String),
        }

        impl $enum_name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $label,
                    )*
                    Self::Custom(label) => label,
                }
            }

            pub fn parse(label: &str) -> Self {
                match label {
                    $(
                        $label => Self::$variant,
                    )*
                    other => Self::Custom(other.to_string()),
                }
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let label = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::parse(&label))
            }
        }
    };
}
