//! Shared fixtures for the integration tests
//!
//! Builds a small blog domain: a `taggable` mixin, an `author` schema, an
//! `article` schema carrying most field types and a `comment` schema that
//! nests messages polymorphically.

#![allow(dead_code)]

use msgfold::{
    DynamicField, DynamicFieldKind, FieldBuilder, GeoPoint, Identifier, IdentifierKind, Message,
    MessageResolver, Mixin, Schema, TypeName, Value,
};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub const ARTICLE_ID: &str = "acme:blog:node:article:1-0-0";
pub const AUTHOR_ID: &str = "acme:blog:node:author:1-0-0";
pub const COMMENT_ID: &str = "acme:blog:node:comment:1-0-0";
pub const TAGGABLE_ID: &str = "acme:core:mixin:taggable:1-0-0";

/// Initialize logging for tests
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn taggable_mixin() -> Arc<Mixin> {
    Mixin::get_or_create(TAGGABLE_ID, || {
        Ok(vec![
            FieldBuilder::new("tags", TypeName::String).as_a_set().build()?,
            FieldBuilder::new("owner", TypeName::String).required().build()?,
            FieldBuilder::new("label", TypeName::String).overridable(true).build()?,
        ])
    })
    .expect("taggable mixin")
}

pub fn author_schema() -> Arc<Schema> {
    Schema::new(
        AUTHOR_ID,
        vec![
            FieldBuilder::new("name", TypeName::String).required().build().unwrap(),
            FieldBuilder::new("email", TypeName::String)
                .format(msgfold::Format::Email)
                .build()
                .unwrap(),
        ],
        vec![],
    )
    .expect("author schema")
}

pub fn article_schema() -> Arc<Schema> {
    Schema::new(
        ARTICLE_ID,
        vec![
            FieldBuilder::new("article_id", TypeName::Uuid).required().build().unwrap(),
            FieldBuilder::new("title", TypeName::String).required().build().unwrap(),
            FieldBuilder::new("body", TypeName::Text).build().unwrap(),
            FieldBuilder::new("views", TypeName::Int).build().unwrap(),
            FieldBuilder::new("rating", TypeName::Float).build().unwrap(),
            FieldBuilder::new("published", TypeName::Boolean).build().unwrap(),
            FieldBuilder::new("published_on", TypeName::Date).build().unwrap(),
            FieldBuilder::new("location", TypeName::GeoPoint).build().unwrap(),
            FieldBuilder::new("links", TypeName::String).as_a_list().build().unwrap(),
            FieldBuilder::new("counters", TypeName::Int).as_a_map().build().unwrap(),
            FieldBuilder::new("extras", TypeName::DynamicField).as_a_list().build().unwrap(),
            FieldBuilder::new("author", TypeName::Message)
                .any_of_curies(&["acme:blog:node:author"])
                .build()
                .unwrap(),
        ],
        vec![taggable_mixin()],
    )
    .expect("article schema")
}

pub fn comment_schema() -> Arc<Schema> {
    Schema::new(
        COMMENT_ID,
        vec![
            FieldBuilder::new("text", TypeName::String).required().build().unwrap(),
            FieldBuilder::new("subject", TypeName::Message)
                .any_of_curies(&["acme:core:mixin:taggable"])
                .build()
                .unwrap(),
            FieldBuilder::new("replies", TypeName::Message).as_a_list().build().unwrap(),
        ],
        vec![],
    )
    .expect("comment schema")
}

/// Resolver with the author, article and comment schemas registered.
pub fn blog_resolver() -> Arc<MessageResolver> {
    init_test_env();
    let resolver = Arc::new(MessageResolver::new());
    resolver.register_schema(author_schema());
    resolver.register_schema(article_schema());
    resolver.register_schema(comment_schema());
    resolver
}

pub fn sample_author() -> Message {
    let mut author = author_schema().create_message();
    author
        .set("name", "Ada")
        .unwrap()
        .set("email", "ada@example.com")
        .unwrap();
    author
}

/// An article with every field populated.
pub fn sample_article() -> Message {
    let mut article = article_schema().create_message();
    article
        .set("article_id", Identifier::from_string(IdentifierKind::Uuid, "6f1d9d1e-9c1e-4d8f-a6b2-7f3a7c2c1f10").unwrap())
        .unwrap()
        .set("title", "Hello, world")
        .unwrap()
        .set("body", "First post")
        .unwrap()
        .set("views", 42)
        .unwrap()
        .set("rating", 4.5)
        .unwrap()
        .set("published", true)
        .unwrap()
        .set("published_on", chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .unwrap()
        .set("location", GeoPoint::new(47.6, -122.3).unwrap())
        .unwrap()
        .set("owner", "ada")
        .unwrap()
        .set("author", sample_author())
        .unwrap();
    article
        .add_to_set("tags", ["Rust", "serde"])
        .unwrap()
        .add_to_list("links", ["https://a.example", "https://b.example"])
        .unwrap()
        .add_to_map("counters", "likes", 3)
        .unwrap()
        .add_to_list(
            "extras",
            [Value::from(
                DynamicField::new("reading_minutes", DynamicFieldKind::IntVal, Value::Int(4)).unwrap(),
            )],
        )
        .unwrap();
    article
}
