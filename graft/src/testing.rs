//! Types shared by the unit tests.

use crate::error::DecodeError;
use crate::shape::{Capability, Decodable, Param, Shape, ValueType};
use crate::value::Arguments;

pub const PERSON: Capability = Capability::new("Person");
pub const IDENTIFIABLE: Capability = Capability::new("Identifiable");

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub book_title: String,
}

impl Decodable for Book {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Book>("Book")
            .params(&const { [Param::new("bookTitle", ValueType::String)] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Book {
            book_title: args.take("bookTitle")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonData {
    pub name: String,
    pub surname: String,
    pub age: u32,
}

impl Decodable for PersonData {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<PersonData>("PersonData")
            .params(&const {
                [
                    Param::new("name", ValueType::String),
                    Param::new("surname", ValueType::String),
                    Param::new("age", ValueType::Int),
                ]
            })
            .implements(&const { [PERSON] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(PersonData {
            name: args.take("name")?,
            surname: args.take("surname")?,
            age: args.take("age")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonId {
    pub id: String,
}

impl Decodable for PersonId {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<PersonId>("PersonId")
            .params(&const { [Param::new("id", ValueType::String)] })
            .implements(&const { [IDENTIFIABLE] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(PersonId {
            id: args.take("id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub person_id: PersonId,
    pub data: PersonData,
    pub university: String,
    pub passed: bool,
    pub subjects: Vec<String>,
    pub book: Book,
}

impl Decodable for Student {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Student>("Student")
            .params(&const {
                [
                    Param::new("personId", ValueType::Object(PersonId::SHAPE)),
                    Param::new("data", ValueType::Object(PersonData::SHAPE)),
                    Param::new("university", ValueType::String),
                    Param::new("passed", ValueType::Bool),
                    Param::new("subjects", ValueType::StringList),
                    Param::new("book", ValueType::Object(Book::SHAPE)),
                ]
            })
            .implements(&const { [PERSON, IDENTIFIABLE] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Student {
            person_id: args.take_object("personId")?,
            data: args.take_object("data")?,
            university: args.take("university")?,
            passed: args.take("passed")?,
            subjects: args.take("subjects")?,
            book: args.take_object("book")?,
        })
    }
}

/// Two parameters fulfill the same capability.
#[derive(Debug)]
pub struct Couple {
    pub first: PersonData,
    pub second: PersonData,
}

impl Decodable for Couple {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Couple>("Couple")
            .params(&const {
                [
                    Param::new("first", ValueType::Object(PersonData::SHAPE)),
                    Param::new("second", ValueType::Object(PersonData::SHAPE)),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Couple {
            first: args.take_object("first")?,
            second: args.take_object("second")?,
        })
    }
}

/// A direct parameter shares a name with a delegate parameter.
#[derive(Debug)]
pub struct Clash {
    pub name: String,
    pub data: PersonData,
}

impl Decodable for Clash {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Clash>("Clash")
            .params(&const {
                [
                    Param::new("name", ValueType::String),
                    Param::new("data", ValueType::Object(PersonData::SHAPE)),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Clash {
            name: args.take("name")?,
            data: args.take_object("data")?,
        })
    }
}

/// The delegate is itself a composite.
#[derive(Debug)]
pub struct Tutor {
    pub student: Student,
    pub subject: String,
}

impl Decodable for Tutor {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Tutor>("Tutor")
            .params(&const {
                [
                    Param::new("student", ValueType::Object(Student::SHAPE)),
                    Param::new("subject", ValueType::String),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Tutor {
            student: args.take_object("student")?,
            subject: args.take("subject")?,
        })
    }
}
