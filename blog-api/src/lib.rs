extern crate serde;
#[macro_use]
extern crate serde_derive;

/// A REST collection exposed by the blog API.
pub trait Endpoint {
    /// Identifier type used for the single-record path segment.
    type Id: ToString;

    fn endpoint() -> &'static str;

    /// Path of one record of this collection.
    fn record(id: &Self::Id) -> String {
        format!("{}/{}", Self::endpoint(), id.to_string())
    }
}

macro_rules! api {
    ($url:expr => $ep:ty) => {
        impl Endpoint for $ep {
            type Id = String;

            fn endpoint() -> &'static str {
                $url
            }
        }
    };
}

pub mod posts;
