//! Models shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use graft::json::{JsonCursor, TokenKind};
use graft::{
    AnyObject, Arguments, Capability, Decodable, DecodeContext, DecodeError, Engine, Param, Shape,
    SubDecoder, ValueType, forward_accessors,
};

// ============================================================================
// Capabilities
// ============================================================================

pub const PERSON: Capability = Capability::new("Person");
pub const IDENTIFIABLE: Capability = Capability::new("Identifiable");
pub const ROOM_INFO: Capability = Capability::new("RoomInfo");

pub trait Person {
    fn name(&self) -> &str;
    fn surname(&self) -> &str;
    fn age(&self) -> u32;
}

pub trait Identifiable {
    fn id(&self) -> &str;
}

pub trait RoomInfo {
    fn title(&self) -> &str;
    fn cover(&self) -> &str;
    fn description(&self) -> &str;
}

// ============================================================================
// Students
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PersonData {
    pub name: String,
    pub surname: String,
    pub age: u32,
}

impl Person for PersonData {
    fn name(&self) -> &str {
        &self.name
    }

    fn surname(&self) -> &str {
        &self.surname
    }

    fn age(&self) -> u32 {
        self.age
    }
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
        record("PersonData");
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

impl Identifiable for PersonId {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Decodable for PersonId {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<PersonId>("PersonId")
            .params(&const { [Param::new("id", ValueType::String)] })
            .implements(&const { [IDENTIFIABLE] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        record("PersonId");
        Ok(PersonId {
            id: args.take("id")?,
        })
    }
}

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

/// A student identified by id, with their personal data embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub person_id: PersonId,
    pub data: PersonData,
    pub university: String,
    pub passed: bool,
    pub subjects: Vec<String>,
    pub book: Book,
}

forward_accessors! {
    impl Identifiable for Student => person_id {
        fn id(&self) -> &str;
    }
}

forward_accessors! {
    impl Person for Student => data {
        fn name(&self) -> &str;
        fn surname(&self) -> &str;
        fn age(&self) -> u32;
    }
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
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        record("Student");
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

/// A student with personal data but no id.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentNoId {
    pub data: PersonData,
    pub university: String,
    pub passed: bool,
    pub subjects: Vec<String>,
    pub book: Book,
}

forward_accessors! {
    impl Person for StudentNoId => data {
        fn name(&self) -> &str;
        fn surname(&self) -> &str;
        fn age(&self) -> u32;
    }
}

impl Decodable for StudentNoId {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<StudentNoId>("StudentNoId")
            .params(&const {
                [
                    Param::new("data", ValueType::Object(PersonData::SHAPE)),
                    Param::new("university", ValueType::String),
                    Param::new("passed", ValueType::Bool),
                    Param::new("subjects", ValueType::StringList),
                    Param::new("book", ValueType::Object(Book::SHAPE)),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        record("StudentNoId");
        Ok(StudentNoId {
            data: args.take_object("data")?,
            university: args.take("university")?,
            passed: args.take("passed")?,
            subjects: args.take("subjects")?,
            book: args.take_object("book")?,
        })
    }
}

pub const JSON_STUDENT: &str = r#"{
    "name": "studentName",
    "surname": "studentSurname",
    "age": 20,
    "university": "universityName",
    "passed": true,
    "subjects": ["Maths", "Geography", "History"],
    "book": {"bookTitle": "Learning to Code"}
}"#;

pub const JSON_STUDENT_WITH_ID: &str = r#"{
    "id": "abcd-1234",
    "name": "studentName",
    "surname": "studentSurname",
    "age": 20,
    "university": "universityName",
    "passed": true,
    "subjects": ["Maths", "Geography", "History"],
    "book": {"bookTitle": "Learning to Code"}
}"#;

pub fn expected_data() -> PersonData {
    PersonData {
        name: "studentName".into(),
        surname: "studentSurname".into(),
        age: 20,
    }
}

pub fn expected_book() -> Book {
    Book {
        book_title: "Learning to Code".into(),
    }
}

pub fn subjects() -> Vec<String> {
    vec!["Maths".into(), "Geography".into(), "History".into()]
}

/// An engine that knows how to decode `book`.
pub fn student_engine() -> Engine {
    Engine::builder()
        .flat::<Book>("$.book")
        .build()
        .expect("student engine builds")
}

// ============================================================================
// Rooms
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RoomId {
    pub id: String,
}

impl Identifiable for RoomId {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Decodable for RoomId {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<RoomId>("RoomId")
            .params(&const { [Param::new("id", ValueType::String)] })
            .implements(&const { [IDENTIFIABLE] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(RoomId {
            id: args.take("id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomData {
    pub title: String,
    pub cover: String,
    pub description: String,
}

impl RoomInfo for RoomData {
    fn title(&self) -> &str {
        &self.title
    }

    fn cover(&self) -> &str {
        &self.cover
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Decodable for RoomData {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<RoomData>("RoomData")
            .params(&const {
                [
                    Param::new("title", ValueType::String),
                    Param::new("cover", ValueType::String),
                    Param::new("description", ValueType::String),
                ]
            })
            .implements(&const { [ROOM_INFO] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(RoomData {
            title: args.take("title")?,
            cover: args.take("cover")?,
            description: args.take("description")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomEvents {
    pub scheduled: Vec<String>,
    pub started: Option<String>,
}

impl Decodable for RoomEvents {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<RoomEvents>("RoomEvents")
            .params(&const { [Param::new("scheduled", ValueType::StringList)] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(RoomEvents {
            scheduled: args.take("scheduled")?,
            started: None,
        })
    }
}

/// Reads `events` by hand, since `started` may be `null`.
pub struct RoomEventsDecoder;

impl SubDecoder for RoomEventsDecoder {
    fn shape(&self) -> &'static Shape {
        RoomEvents::SHAPE
    }

    fn decode(
        &self,
        cursor: &mut dyn JsonCursor,
        _context: &DecodeContext<'_>,
    ) -> Result<AnyObject, DecodeError> {
        let mut scheduled = Vec::new();
        let mut started = None;

        cursor.begin_object()?;
        while cursor.has_next()? {
            match cursor.next_name()?.as_str() {
                "scheduled" => {
                    cursor.begin_array()?;
                    while cursor.has_next()? {
                        scheduled.push(cursor.next_str()?);
                    }
                    cursor.end_array()?;
                }
                "started" if cursor.peek()? == TokenKind::Null => cursor.skip_value()?,
                "started" => started = Some(cursor.next_str()?),
                _ => cursor.skip_value()?,
            }
        }
        cursor.end_object()?;

        Ok(AnyObject::new(RoomEvents { scheduled, started }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub room_id: RoomId,
    pub data: RoomData,
    pub host: String,
    pub events: RoomEvents,
    /// Local only; never sent by the server.
    pub is_subscribed: bool,
}

forward_accessors! {
    impl Identifiable for Room => room_id {
        fn id(&self) -> &str;
    }
}

forward_accessors! {
    impl RoomInfo for Room => data {
        fn title(&self) -> &str;
        fn cover(&self) -> &str;
        fn description(&self) -> &str;
    }
}

impl Decodable for Room {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Room>("Room")
            .params(&const {
                [
                    Param::new("roomId", ValueType::Object(RoomId::SHAPE)),
                    Param::new("data", ValueType::Object(RoomData::SHAPE)),
                    Param::new("host", ValueType::String),
                    Param::new("events", ValueType::Object(RoomEvents::SHAPE)),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        Ok(Room {
            room_id: args.take_object("roomId")?,
            data: args.take_object("data")?,
            host: args.take("host")?,
            events: args.take_object("events")?,
            is_subscribed: false,
        })
    }
}

pub const JSON_ROOMS: &str = r#"[
    {
        "id": "01F2KMBWSAEVBTE8WM5W7B25AY",
        "title": "Barnaby's fun room",
        "cover": "https://example.invalid/cover.png",
        "description": "Funtime with Barnaby Jones",
        "events": {
            "scheduled": ["0001G7CZERZJ0ZM71JM3SGX6NZ"],
            "started": null
        },
        "host": "69a4a3c0-a7b8-11ea-b178-ad8f8454f900"
    },
    {
        "host": "h2",
        "events": {"scheduled": [], "started": "0001G7D0000000000000000000"},
        "description": "d2",
        "cover": "c2",
        "title": "t2",
        "id": "r2"
    }
]"#;

pub fn room_engine() -> Engine {
    Engine::builder()
        .register::<Room>(&[IDENTIFIABLE, ROOM_INFO])
        .sub_decoder("events", RoomEventsDecoder)
        .build()
        .expect("room engine builds")
}

// ============================================================================
// One delegate, two capabilities
// ============================================================================

pub const TAGGED: Capability = Capability::new("Tagged");

pub trait Tagged {
    fn tag(&self) -> &str;
}

/// Identifies and tags its holder at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub id: String,
    pub tag: String,
}

impl Identifiable for Badge {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Tagged for Badge {
    fn tag(&self) -> &str {
        &self.tag
    }
}

impl Decodable for Badge {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Badge>("Badge")
            .params(&const {
                [
                    Param::new("id", ValueType::String),
                    Param::new("tag", ValueType::String),
                ]
            })
            .implements(&const { [IDENTIFIABLE, TAGGED] })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        record("Badge");
        Ok(Badge {
            id: args.take("id")?,
            tag: args.take("tag")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub badge: Badge,
    pub level: u32,
}

forward_accessors! {
    impl Identifiable for Member => badge {
        fn id(&self) -> &str;
    }
}

forward_accessors! {
    impl Tagged for Member => badge {
        fn tag(&self) -> &str;
    }
}

impl Decodable for Member {
    const SHAPE: &'static Shape = &const {
        Shape::builder_for::<Member>("Member")
            .params(&const {
                [
                    Param::new("badge", ValueType::Object(Badge::SHAPE)),
                    Param::new("level", ValueType::Int),
                ]
            })
            .build()
    };

    fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
        record("Member");
        Ok(Member {
            badge: args.take_object("badge")?,
            level: args.take("level")?,
        })
    }
}

// ============================================================================
// Construction order
// ============================================================================

thread_local! {
    static CONSTRUCTED: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record(type_identifier: &'static str) {
    CONSTRUCTED.with(|c| c.borrow_mut().push(type_identifier));
}

/// Types constructed on this thread since the last call, in order.
pub fn take_constructed() -> Vec<&'static str> {
    CONSTRUCTED.with(|c| core::mem::take(&mut *c.borrow_mut()))
}
