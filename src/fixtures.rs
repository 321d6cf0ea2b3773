//! Test entities shared by the unit and property tests

use crate::schema::{FilterEnum, Filterable, Schema, SchemaBuilder};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Inactive,
    Graduated,
}

impl FilterEnum for Status {
    const NAME: &'static str = "Status";
    const VARIANTS: &'static [&'static str] = &["Active", "Inactive", "Graduated"];

    fn variant_index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub post_code: Option<String>,
}

impl Filterable for Address {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Address>> = Lazy::new(|| {
            SchemaBuilder::new("Address")
                .field("Street", |a: &Address| a.street.clone())
                .field("City", |a: &Address| a.city.clone())
                .field("PostCode", |a: &Address| a.post_code.clone())
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub password: String,
    pub age: i32,
    pub cgpa: f64,
    pub credits: u32,
    pub active: bool,
    pub status: Status,
    pub department: Option<String>,
    pub enrolled_on: NaiveDate,
    pub last_login: Option<NaiveDateTime>,
    pub address: Address,
    pub mentor: Option<Address>,
}

impl Filterable for Student {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Student>> = Lazy::new(|| {
            SchemaBuilder::new("Student")
                .field("Id", |s: &Student| s.id)
                .field("Name", |s: &Student| s.name.clone())
                .field("Password", |s: &Student| s.password.clone())
                .field("Age", |s: &Student| s.age)
                .field("CGPA", |s: &Student| s.cgpa)
                .field("Credits", |s: &Student| s.credits)
                .field("Active", |s: &Student| s.active)
                .enum_field("Status", |s: &Student| s.status)
                .field("Department", |s: &Student| s.department.clone())
                .field("EnrolledOn", |s: &Student| s.enrolled_on)
                .field("LastLogin", |s: &Student| s.last_login)
                .nested("Address", |s: &Student| &s.address, Address::schema())
                .optional_nested("Mentor", |s: &Student| s.mentor.as_ref(), Address::schema())
                .build()
        });
        &SCHEMA
    }
}

impl Student {
    pub fn sample() -> Self {
        Self {
            id: Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8),
            name: "John Smith".to_string(),
            password: "hunter2".to_string(),
            age: 21,
            cgpa: 3.5,
            credits: 90,
            active: true,
            status: Status::Active,
            department: Some("CS".to_string()),
            enrolled_on: date(2022, 9, 1),
            last_login: None,
            address: Address {
                street: "742 Evergreen Terrace".to_string(),
                city: "Springfield".to_string(),
                post_code: Some("49007".to_string()),
            },
            mentor: None,
        }
    }

    pub fn roster() -> Vec<Self> {
        let base = Self::sample();
        vec![
            base.clone(),
            Self {
                id: Uuid::from_u128(2),
                name: "Jane Doe".to_string(),
                age: 19,
                cgpa: 3.9,
                status: Status::Inactive,
                department: Some("EE".to_string()),
                ..base.clone()
            },
            Self {
                id: Uuid::from_u128(3),
                name: "Bob Stone".to_string(),
                age: 25,
                cgpa: 2.8,
                status: Status::Graduated,
                department: None,
                ..base.clone()
            },
            Self {
                id: Uuid::from_u128(4),
                name: "Alice Wong".to_string(),
                age: 22,
                cgpa: 3.1,
                department: Some("ME".to_string()),
                mentor: Some(base.address.clone()),
                ..base
            },
        ]
    }
}

/// Entity whose schema registers two members differing only in case
#[derive(Debug, Clone, Default)]
pub struct Ambiguous {
    pub name: String,
}

impl Filterable for Ambiguous {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Ambiguous>> = Lazy::new(|| {
            SchemaBuilder::new("Ambiguous")
                .field("Name", |a: &Ambiguous| a.name.clone())
                .field("NAME", |a: &Ambiguous| a.name.to_uppercase())
                .build()
        });
        &SCHEMA
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
