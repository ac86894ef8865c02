//! `define_port_error!`: declares a port error enum together with one
//! snake-case constructor per variant.
//!
//! Struct-variant constructors take `impl Into<T>` for every field, so
//! adapters can pass `&str` messages or narrower integers directly, for
//! example `BookingLedgerError::insufficient_funds(balance, required)` or
//! `TokenVerifierError::connection("pool timed out")`.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
