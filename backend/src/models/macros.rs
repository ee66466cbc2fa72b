/// Declares a newtype identifier over a scalar key.
///
/// The generated type derives the usual value traits plus serde, renders
/// through `Display` as the bare inner value, and converts both ways with
/// the inner type. Store keys are `i64`; series identifiers wrap a UUID.
///
/// ```ignore
/// define_id_type!(i64, AssignmentId, "Assignment primary key.");
/// ```
#[macro_export]
macro_rules! define_id_type {
    ($inner:ty, $name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<$inner> for $name {
            fn from(v: $inner) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<$name> for $inner {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: $inner) -> Self {
                $name(value)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }
    };
}
