/// Implement a trait (or inherent accessors) on a composite by forwarding
/// every method to an embedded delegate field.
///
/// Only `&self` methods without further arguments are supported; these are
/// the accessors a capability trait exposes.
///
/// ```
/// use graft::forward_accessors;
///
/// pub trait Person {
///     fn name(&self) -> &str;
///     fn age(&self) -> u32;
/// }
///
/// struct PersonData {
///     name: String,
///     age: u32,
/// }
///
/// impl Person for PersonData {
///     fn name(&self) -> &str {
///         &self.name
///     }
///     fn age(&self) -> u32 {
///         self.age
///     }
/// }
///
/// struct Student {
///     data: PersonData,
///     university: String,
/// }
///
/// forward_accessors! {
///     impl Person for Student => data {
///         fn name(&self) -> &str;
///         fn age(&self) -> u32;
///     }
/// }
///
/// let student = Student {
///     data: PersonData { name: "Ada".into(), age: 20 },
///     university: "U".into(),
/// };
/// assert_eq!(student.name(), "Ada");
/// assert_eq!(student.age(), 20);
/// ```
#[macro_export]
macro_rules! forward_accessors {
    (
        impl $trait_:ident for $ty:ty => $field:ident {
            $( fn $name:ident(&self) -> $ret:ty; )*
        }
    ) => {
        impl $trait_ for $ty {
            $(
                fn $name(&self) -> $ret {
                    self.$field.$name()
                }
            )*
        }
    };
    (
        impl $ty:ty => $field:ident {
            $( $vis:vis fn $name:ident(&self) -> $ret:ty; )*
        }
    ) => {
        impl $ty {
            $(
                #[doc = concat!("Forwarded to `", stringify!($field), "`.")]
                $vis fn $name(&self) -> $ret {
                    self.$field.$name()
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::testing::{PersonData, Student};

    trait Named {
        fn name(&self) -> &str;
        fn surname(&self) -> &str;
    }

    impl Named for PersonData {
        fn name(&self) -> &str {
            &self.name
        }

        fn surname(&self) -> &str {
            &self.surname
        }
    }

    impl PersonData {
        fn years(&self) -> u32 {
            self.age
        }
    }

    forward_accessors! {
        impl Named for Student => data {
            fn name(&self) -> &str;
            fn surname(&self) -> &str;
        }
    }

    forward_accessors! {
        impl Student => data {
            fn years(&self) -> u32;
        }
    }

    #[test]
    fn forwards_to_the_delegate() {
        let student = Student {
            person_id: crate::testing::PersonId { id: "x".into() },
            data: PersonData {
                name: "n".into(),
                surname: "s".into(),
                age: 9,
            },
            university: "u".into(),
            passed: false,
            subjects: vec![],
            book: crate::testing::Book {
                book_title: "b".into(),
            },
        };
        assert_eq!(Named::name(&student), "n");
        assert_eq!(student.surname(), "s");
        assert_eq!(student.years(), 9);
    }
}
