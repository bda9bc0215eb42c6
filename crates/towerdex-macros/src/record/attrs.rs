//! Parsing of `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

const EXPECTED_KINDS: &str = "String, Number, Timestamp, Enum, Bool, Tags";

/// How a field is exposed to the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `#[record(String)]`: anything `AsRef<str>`.
    String,
    /// `#[record(Number)]`: a `Copy` number convertible to `Number`.
    Number,
    /// `#[record(Timestamp)]`: implements `RecordTimestamp`.
    Timestamp,
    /// `#[record(Enum)]`: implements `RecordEnum`, exposed by label.
    Enum,
    /// `#[record(Bool)]`
    Bool,
    /// `#[record(Tags)]`: a collection whose items implement `RecordTag`.
    Tags,
}

impl FieldKind {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            "Tags" | "tags" => Ok(FieldKind::Tags),
            other => Err(Error::new(
                span,
                format!("unknown record kind: '{other}'. Expected one of: {EXPECTED_KINDS}"),
            )),
        }
    }

    fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string(), ident.span())
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RecordAttr {
    pub kind: Option<FieldKind>,
    pub skip: bool,
    /// Query name, defaulting to the field name.
    pub rename: Option<String>,
}

fn string_literal(expr: &Expr, what: &str) -> Result<syn::LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{what} must be a string literal"),
        )),
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) => {
                    let ident = p.get_ident().ok_or_else(|| {
                        Error::new(p.span(), format!("expected {EXPECTED_KINDS} or skip"))
                    })?;
                    attr.kind = Some(FieldKind::from_ident(ident)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_literal(&nv.value, "rename")?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let lit = string_literal(&nv.value, "ty")?;
                    attr.kind = Some(FieldKind::parse_name(&lit.value(), lit.span())?);
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown attribute. Expected: rename or ty",
                    ));
                }
                Meta::List(list) => {
                    return Err(Error::new(
                        list.span(),
                        format!(
                            "unknown record attribute. Expected: {EXPECTED_KINDS}, skip, rename = \"...\", or ty = \"...\""
                        ),
                    ));
                }
            }
        }

        if attr.skip && attr.kind.is_some() {
            return Err(Error::new(
                input.span(),
                "skip cannot be combined with a field kind",
            ));
        }

        Ok(attr)
    }
}

/// Reads the `#[record(...)]` attribute of a field, if any.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}
