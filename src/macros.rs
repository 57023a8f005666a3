//! Declarative helpers for the numeric tables exported by telldus-core.

/// Declares native error codes as `c_int` constants together with a name and
/// description lookup.
macro_rules! define_error_codes {
    ($($name:ident = $val:literal => $desc:literal),* $(,)?) => {
        $(
            #[doc = $desc]
            pub const $name: ::std::os::raw::c_int = $val;
        )*

        /// Returns the symbolic name of a native error code.
        pub fn error_code_name(code: ::std::os::raw::c_int) -> Option<&'static str> {
            match code {
                $($val => Some(stringify!($name)),)*
                _ => None,
            }
        }

        /// Returns the built-in description of a native error code.
        ///
        /// Used when the library itself has no message for the code.
        pub fn error_description(code: ::std::os::raw::c_int) -> Option<&'static str> {
            match code {
                $($val => Some($desc),)*
                _ => None,
            }
        }
    };
}

/// Declares a closed set of native integer values as a Rust enum.
macro_rules! define_native_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = ($label:literal, $val:literal)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $($variant = $val,)*
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn from_raw(raw: ::std::os::raw::c_int) -> Option<Self> {
                match raw {
                    $($val => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn as_raw(self) -> ::std::os::raw::c_int {
                self as ::std::os::raw::c_int
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)*
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}
