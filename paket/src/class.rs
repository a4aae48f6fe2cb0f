//! Static classification of Rust types. Every type that can be encoded names its category and the
//! tag its buffers carry through the `Classify` trait. Nothing here looks at runtime values.

use crate::codec::WideString;
use crate::header::WireTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Fixed width values: booleans, integers, floats and characters.
    Fundamental,
    /// Null terminated character strings.
    Text,
    /// Sequences and pairs, encoded in terms of their elements.
    Composite,
    /// Types supplying their own encoding through a `Record`.
    Opaque,
}

pub trait Classify {
    const CATEGORY: Category;
    /// The tag every buffer encoded from this type carries.
    const TAG: WireTag;
}

macro_rules! classify {
    ($($t:ty => $cat:ident, $tag:ident;)+) => {
        $(
            impl Classify for $t {
                const CATEGORY: Category = Category::$cat;
                const TAG: WireTag = WireTag::$tag;
            }
        )+
    };
}

classify! {
    bool       => Fundamental, Bool;
    i32        => Fundamental, Int;
    u64        => Fundamental, Size;
    usize      => Fundamental, Size;
    f32        => Fundamental, Float;
    f64        => Fundamental, Double;
    u8         => Fundamental, Char;
    char       => Fundamental, WideChar;
    str        => Text,        String;
    String     => Text,        String;
    WideString => Text,        WideString;
}

impl<T: Classify> Classify for [T] {
    const CATEGORY: Category = Category::Composite;
    const TAG: WireTag = WireTag::Sequence;
}

impl<T: Classify> Classify for Vec<T> {
    const CATEGORY: Category = Category::Composite;
    const TAG: WireTag = WireTag::Sequence;
}

impl<A: Classify, B: Classify> Classify for (A, B) {
    const CATEGORY: Category = Category::Composite;
    const TAG: WireTag = WireTag::Pair;
}

impl<T: Classify + ?Sized> Classify for &T {
    const CATEGORY: Category = T::CATEGORY;
    const TAG: WireTag = T::TAG;
}

#[cfg(test)]
mod tests {
    use super::{Category, Classify};
    use crate::codec::WideString;
    use crate::header::WireTag;

    fn class<T: Classify + ?Sized>() -> (Category, WireTag) {
        (T::CATEGORY, T::TAG)
    }

    #[test]
    fn fundamentals() {
        assert_eq!((Category::Fundamental, WireTag::Bool), class::<bool>());
        assert_eq!((Category::Fundamental, WireTag::Int), class::<i32>());
        assert_eq!((Category::Fundamental, WireTag::Size), class::<usize>());
        assert_eq!((Category::Fundamental, WireTag::Size), class::<u64>());
        assert_eq!((Category::Fundamental, WireTag::Float), class::<f32>());
        assert_eq!((Category::Fundamental, WireTag::Double), class::<f64>());
        assert_eq!((Category::Fundamental, WireTag::Char), class::<u8>());
        assert_eq!((Category::Fundamental, WireTag::WideChar), class::<char>());
    }

    #[test]
    fn text() {
        assert_eq!((Category::Text, WireTag::String), class::<str>());
        assert_eq!((Category::Text, WireTag::String), class::<String>());
        assert_eq!((Category::Text, WireTag::WideString), class::<WideString>());
    }

    #[test]
    fn composites() {
        assert_eq!((Category::Composite, WireTag::Sequence), class::<Vec<i32>>());
        assert_eq!((Category::Composite, WireTag::Sequence), class::<[String]>());
        assert_eq!((Category::Composite, WireTag::Pair), class::<(i32, Vec<f64>)>());
        assert_eq!((Category::Composite, WireTag::Pair), class::<&(u8, char)>());
    }

}
