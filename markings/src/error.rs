use crate::property::{PropertyKind, PropertyName};
use crate::StyleType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("could not parse xml: {0}")]
    Parse(#[from] xmltree::ParseError),
    #[error("could not write xml: {0}")]
    Write(#[from] xmltree::Error),
    #[error("expected a <{expected}> element, got <{got}>")]
    WrongElement { expected: &'static str, got: String },
    #[error("missing style type attribute")]
    MissingType,
    #[error("unknown style type: {0}")]
    UnknownType(String),
    #[error("style type {0:?} is not a {1} style")]
    WrongFamily(StyleType, &'static str),
}

#[derive(Error, Debug, PartialEq)]
pub enum PropertyError {
    #[error("{style:?} does not expose {name:?}")]
    NotExposed { name: PropertyName, style: StyleType },
    #[error("{name:?} expects a {expected:?} value, got {got:?}")]
    WrongKind {
        name: PropertyName,
        expected: PropertyKind,
        got: PropertyKind,
    },
    #[error("no marking with this id")]
    UnknownMarking,
    #[error("{0:?} cannot be used on this marking")]
    IncompatibleType(StyleType),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
